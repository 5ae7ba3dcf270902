use anyhow::Result;

use pagefx_core::{styles, PageFxConfig};

pub fn run(config: &PageFxConfig) -> Result<()> {
    print!("{}", styles::keyframes(&config.ripple));
    Ok(())
}
