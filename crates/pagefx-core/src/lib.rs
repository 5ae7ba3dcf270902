pub mod config;
pub mod dom;
pub mod error;
pub mod event;
pub mod form;
pub mod menu;
pub mod reveal;
pub mod ripple;
pub mod scheduler;
pub mod scroll;
pub mod site;
pub mod styles;
pub mod tracker;

pub use config::{EasingType, PageFxConfig, ScrollConfig};
pub use dom::{ElementId, MemoryPage, Page};
pub use error::{Error, Result};
pub use event::{EventOutcome, Key, PageEvent};
pub use menu::{MenuController, MenuState};
pub use scheduler::{Scheduler, Task, TaskHandle};
pub use site::Site;
pub use tracker::{EventTracker, TrackedEvent};
