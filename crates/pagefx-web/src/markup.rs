//! Configuration embedded in the page
//!
//! Sites tune the engine with an inline TOML block:
//!
//! ```html
//! <script type="application/toml" id="pagefx-config">
//! [scroll]
//! animation_duration_ms = 800
//! </script>
//! ```

use pagefx_core::{PageFxConfig, Result};

/// Id of the `<script>` element holding the configuration
pub const CONFIG_ELEMENT_ID: &str = "pagefx-config";

/// Parse the embedded block; a missing or blank block yields defaults
pub fn config_from_markup(text: Option<&str>) -> Result<PageFxConfig> {
    match text.map(str::trim) {
        Some(text) if !text.is_empty() => PageFxConfig::from_toml_str(text),
        _ => Ok(PageFxConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_block_uses_defaults() {
        let config = config_from_markup(None).unwrap();
        assert_eq!(config.scroll.animation_duration_ms, 1000);
        let config = config_from_markup(Some("   \n ")).unwrap();
        assert_eq!(config.back_to_top.threshold, 300.0);
    }

    #[test]
    fn test_inline_overrides() {
        let config = config_from_markup(Some(
            r#"
            [scroll]
            animation_duration_ms = 800

            [tracking]
            enabled = false
            "#,
        ))
        .unwrap();
        assert_eq!(config.scroll.animation_duration_ms, 800);
        assert!(!config.tracking.enabled);
        assert_eq!(config.nav.close_delay_ms, 300);
    }

    #[test]
    fn test_invalid_block_is_an_error() {
        assert!(config_from_markup(Some("[reveal]\ncard_threshold = 3.0")).is_err());
        assert!(config_from_markup(Some("not toml")).is_err());
    }
}
