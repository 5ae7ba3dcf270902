use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageFxConfig {
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub header: HeaderConfig,
    #[serde(default)]
    pub nav: NavConfig,
    #[serde(default)]
    pub back_to_top: BackToTopConfig,
    #[serde(default)]
    pub ripple: RippleConfig,
    #[serde(default)]
    pub parallax: ParallaxConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Easing curve used by the smooth scroll animator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    /// No interpolation, constant velocity
    Linear,
    /// Cubic ease-in-out: accelerate over the first half, decelerate over the second
    #[default]
    InOutCubic,
    /// Cubic ease-out: fast start, slow finish
    OutCubic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Animate anchor navigation (false = jump instantly)
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    /// Anchor navigation animation duration in milliseconds
    #[serde(default = "default_scroll_duration")]
    pub animation_duration_ms: u64,
    /// Easing curve for anchor navigation
    #[serde(default)]
    pub easing: EasingType,
    /// Quiet period before scroll subscribers run (0 = every frame)
    #[serde(default)]
    pub debounce_ms: u64,
    /// Frame interval used by native hosts that drive the frame clock themselves
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            animation_duration_ms: default_scroll_duration(),
            easing: EasingType::default(),
            debounce_ms: 0,
            frame_interval_ms: default_frame_interval(),
        }
    }
}

impl ScrollConfig {
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        if self.frame_interval_ms == 0 {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(self.frame_interval_ms)
        }
    }

    /// Debounce window, `None` when scroll subscribers react every frame
    pub fn debounce(&self) -> Option<Duration> {
        (self.debounce_ms > 0).then(|| Duration::from_millis(self.debounce_ms))
    }

    #[inline]
    pub fn is_smooth(&self) -> bool {
        self.smooth_enabled && self.animation_duration_ms > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// Scroll offset past which the header gets its denser background and shadow
    #[serde(default = "default_shade_threshold")]
    pub shade_threshold: f64,
    /// Scroll offset past which scrolling down hides the header
    #[serde(default = "default_hide_threshold")]
    pub hide_threshold: f64,
    #[serde(default = "default_header_background")]
    pub background: String,
    #[serde(default = "default_header_background_scrolled")]
    pub background_scrolled: String,
    #[serde(default = "default_header_shadow_scrolled")]
    pub shadow_scrolled: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            shade_threshold: default_shade_threshold(),
            hide_threshold: default_hide_threshold(),
            background: default_header_background(),
            background_scrolled: default_header_background_scrolled(),
            shadow_scrolled: default_header_shadow_scrolled(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavConfig {
    /// Distance above a section's top at which its nav link becomes active
    #[serde(default = "default_section_offset")]
    pub section_offset: f64,
    /// Exit animation length before the menu state is cleared
    #[serde(default = "default_close_delay")]
    pub close_delay_ms: u64,
    /// Vertical travel required for a touch swipe to count
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            section_offset: default_section_offset(),
            close_delay_ms: default_close_delay(),
            swipe_threshold: default_swipe_threshold(),
        }
    }
}

impl NavConfig {
    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackToTopConfig {
    #[serde(default = "default_back_to_top_threshold")]
    pub threshold: f64,
}

impl Default for BackToTopConfig {
    fn default() -> Self {
        Self {
            threshold: default_back_to_top_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RippleConfig {
    /// Overlay lifetime; also the length of the `ripple` keyframe animation
    #[serde(default = "default_ripple_lifetime")]
    pub lifetime_ms: u64,
    /// Final scale of the overlay
    #[serde(default = "default_ripple_scale")]
    pub scale: f64,
    #[serde(default = "default_ripple_color")]
    pub color: String,
}

impl Default for RippleConfig {
    fn default() -> Self {
        Self {
            lifetime_ms: default_ripple_lifetime(),
            scale: default_ripple_scale(),
            color: default_ripple_color(),
        }
    }
}

impl RippleConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallaxConfig {
    /// Hero background moves at this fraction of the scroll speed
    #[serde(default = "default_parallax_speed")]
    pub hero_rate: f64,
    /// Speed for `data-parallax` elements whose attribute is empty or invalid
    #[serde(default = "default_parallax_speed")]
    pub default_speed: f64,
    /// Total travel of a divider while it crosses the viewport
    #[serde(default = "default_divider_travel")]
    pub divider_travel: f64,
    /// Divider offset at the moment it enters the viewport
    #[serde(default = "default_divider_base")]
    pub divider_base: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            hero_rate: default_parallax_speed(),
            default_speed: default_parallax_speed(),
            divider_travel: default_divider_travel(),
            divider_base: default_divider_base(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Delay between consecutive staggered reveals
    #[serde(default = "default_stagger")]
    pub stagger_ms: u64,
    /// Delay between consecutive dividers in the anchor-navigation highlight
    #[serde(default = "default_divider_stagger")]
    pub divider_stagger_ms: u64,
    #[serde(default = "default_divider_threshold")]
    pub divider_threshold: f64,
    #[serde(default = "default_section_threshold")]
    pub section_threshold: f64,
    #[serde(default = "default_card_threshold")]
    pub card_threshold: f64,
    /// Root margin (all sides) for the divider and section watchers
    #[serde(default = "default_reveal_margin")]
    pub margin: f64,
    /// Bottom root margin for the card watcher (negative shrinks the viewport)
    #[serde(default = "default_card_bottom_margin")]
    pub card_bottom_margin: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            stagger_ms: default_stagger(),
            divider_stagger_ms: default_divider_stagger(),
            divider_threshold: default_divider_threshold(),
            section_threshold: default_section_threshold(),
            card_threshold: default_card_threshold(),
            margin: default_reveal_margin(),
            card_bottom_margin: default_card_bottom_margin(),
        }
    }
}

impl RevealConfig {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    pub fn divider_stagger(&self) -> Duration {
        Duration::from_millis(self.divider_stagger_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Emit analytics log lines
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_scroll_duration() -> u64 {
    1000
}

fn default_frame_interval() -> u64 {
    16 // ~60fps
}

fn default_shade_threshold() -> f64 {
    100.0
}

fn default_hide_threshold() -> f64 {
    500.0
}

fn default_header_background() -> String {
    "rgba(28, 28, 30, 0.95)".to_string()
}

fn default_header_background_scrolled() -> String {
    "rgba(28, 28, 30, 0.98)".to_string()
}

fn default_header_shadow_scrolled() -> String {
    "0 2px 20px rgba(0, 0, 0, 0.1)".to_string()
}

fn default_section_offset() -> f64 {
    150.0
}

fn default_close_delay() -> u64 {
    300
}

fn default_swipe_threshold() -> f64 {
    50.0
}

fn default_back_to_top_threshold() -> f64 {
    300.0
}

fn default_ripple_lifetime() -> u64 {
    600
}

fn default_ripple_scale() -> f64 {
    4.0
}

fn default_ripple_color() -> String {
    "rgba(255, 255, 255, 0.3)".to_string()
}

fn default_parallax_speed() -> f64 {
    0.5
}

fn default_divider_travel() -> f64 {
    20.0
}

fn default_divider_base() -> f64 {
    -30.0
}

fn default_stagger() -> u64 {
    100
}

fn default_divider_stagger() -> u64 {
    150
}

fn default_divider_threshold() -> f64 {
    0.3
}

fn default_section_threshold() -> f64 {
    0.1
}

fn default_card_threshold() -> f64 {
    0.1
}

fn default_reveal_margin() -> f64 {
    50.0
}

fn default_card_bottom_margin() -> f64 {
    -50.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl PageFxConfig {
    /// Load configuration from the default location or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let path = expand_tilde(path);
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text; missing keys fall back to defaults
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> crate::Result<()> {
        let thresholds = [
            ("reveal.divider_threshold", self.reveal.divider_threshold),
            ("reveal.section_threshold", self.reveal.section_threshold),
            ("reveal.card_threshold", self.reveal.card_threshold),
        ];
        for (key, value) in thresholds {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::Error::Config(format!(
                    "{} must be within [0, 1], got {}",
                    key, value
                )));
            }
        }
        if self.nav.swipe_threshold < 0.0 {
            return Err(crate::Error::Config(
                "nav.swipe_threshold must not be negative".to_string(),
            ));
        }
        if self.ripple.scale <= 0.0 {
            return Err(crate::Error::Config(
                "ripple.scale must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/pagefx/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("pagefx")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_site_constants() {
        let config = PageFxConfig::default();
        assert!(config.scroll.smooth_enabled);
        assert_eq!(config.scroll.animation_duration_ms, 1000);
        assert_eq!(config.scroll.easing, EasingType::InOutCubic);
        assert_eq!(config.scroll.debounce(), None);
        assert_eq!(config.header.shade_threshold, 100.0);
        assert_eq!(config.header.hide_threshold, 500.0);
        assert_eq!(config.nav.close_delay(), Duration::from_millis(300));
        assert_eq!(config.nav.swipe_threshold, 50.0);
        assert_eq!(config.back_to_top.threshold, 300.0);
        assert_eq!(config.ripple.lifetime(), Duration::from_millis(600));
        assert_eq!(config.ripple.scale, 4.0);
        assert_eq!(config.reveal.stagger(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PageFxConfig::from_toml_str(
            r#"
            [scroll]
            animation_duration_ms = 400
            easing = "out_cubic"
            debounce_ms = 50

            [nav]
            swipe_threshold = 80.0
            "#,
        )
        .unwrap();

        assert_eq!(config.scroll.animation_duration(), Duration::from_millis(400));
        assert_eq!(config.scroll.easing, EasingType::OutCubic);
        assert_eq!(config.scroll.debounce(), Some(Duration::from_millis(50)));
        assert_eq!(config.nav.swipe_threshold, 80.0);
        assert_eq!(config.nav.close_delay_ms, 300);
        assert_eq!(config.header.background, "rgba(28, 28, 30, 0.95)");
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let result = PageFxConfig::from_toml_str(
            r#"
            [reveal]
            card_threshold = 1.5
            "#,
        );
        assert!(matches!(result, Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_is_smooth() {
        let mut config = ScrollConfig::default();
        assert!(config.is_smooth());

        config.smooth_enabled = false;
        assert!(!config.is_smooth());

        config.smooth_enabled = true;
        config.animation_duration_ms = 0;
        assert!(!config.is_smooth());
    }

    #[test]
    fn test_toml_round_trip_is_loadable() {
        let text = PageFxConfig::default().to_toml_string().unwrap();
        let parsed = PageFxConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.reveal.divider_stagger_ms, 150);
    }
}
