use anyhow::Result;

use pagefx_core::PageFxConfig;

pub fn run(config: &PageFxConfig) -> Result<()> {
    print!("{}", config.to_toml_string()?);
    Ok(())
}
