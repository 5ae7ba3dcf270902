pub mod config;
pub mod keyframes;
pub mod simulate;
