//! Smooth scroll animator
//!
//! Combines easing functions and timing utilities to move the viewport to a
//! target offset across animation frames.

use std::time::Duration;

use tracing::debug;

use super::easing::EasingType;
use super::timing::{is_complete, lerp, progress};
use crate::config::ScrollConfig;

/// One in-flight scroll animation
#[derive(Debug, Clone)]
struct ActiveAnimation {
    /// Timestamp of the first frame that sampled this animation
    start: Option<Duration>,
    /// Scroll position when the animation was requested
    from: f64,
    /// Target scroll position
    to: f64,
    duration: Duration,
    easing: EasingType,
}

impl ActiveAnimation {
    /// Position for the frame at `now`, and whether this was the last frame
    fn sample(&mut self, now: Duration) -> (f64, bool) {
        let start = *self.start.get_or_insert(now);
        let elapsed = now.saturating_sub(start);
        let eased = self.easing.apply(progress(elapsed, self.duration));
        (lerp(self.from, self.to, eased), is_complete(elapsed, self.duration))
    }
}

/// Frame-driven scroll animator
///
/// Call `scroll_to()` to request an animation, then `update()` once per
/// animation frame with the frame timestamp. Requests are independent: a new
/// request does not cancel one already running, and while both are alive each
/// frame applies them in request order, so the latest request decides the
/// visible position.
#[derive(Debug, Clone, Default)]
pub struct ScrollAnimator {
    animations: Vec<ActiveAnimation>,
    config: ScrollConfig,
}

impl ScrollAnimator {
    /// Create a new scroll animator with configuration
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            animations: Vec::new(),
            config,
        }
    }

    /// Get current configuration
    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Check if any animation is still running
    #[inline]
    pub fn is_animating(&self) -> bool {
        !self.animations.is_empty()
    }

    /// Number of animations racing for the scroll position
    pub fn active(&self) -> usize {
        self.animations.len()
    }

    /// Request an animation from `from` to `target` with the configured duration
    ///
    /// Returns the position to apply immediately when smooth scrolling is
    /// disabled; `None` means the animation will run on upcoming frames.
    pub fn scroll_to(&mut self, from: f64, target: f64) -> Option<f64> {
        let duration = self.config.animation_duration();
        self.scroll_to_with_duration(from, target, duration)
    }

    /// Same as [`scroll_to`](Self::scroll_to) with an explicit duration
    pub fn scroll_to_with_duration(
        &mut self,
        from: f64,
        target: f64,
        duration: Duration,
    ) -> Option<f64> {
        if !self.config.smooth_enabled || duration.is_zero() {
            // Instant jump when smooth scrolling is disabled
            return Some(target);
        }

        debug!(from, target, duration_ms = duration.as_millis() as u64, "Smooth scroll requested");
        self.animations.push(ActiveAnimation {
            start: None,
            from,
            to: target,
            duration,
            easing: self.config.easing,
        });
        None
    }

    /// Advance every animation to the frame at `now`
    ///
    /// Returns the scroll position written by the last animation this frame,
    /// or `None` when nothing is animating.
    pub fn update(&mut self, now: Duration) -> Option<f64> {
        let mut written = None;
        self.animations.retain_mut(|animation| {
            let (position, done) = animation.sample(now);
            written = Some(position);
            !done
        });
        written
    }

    /// Drop all running animations
    pub fn cancel(&mut self) {
        self.animations.clear();
    }
}
