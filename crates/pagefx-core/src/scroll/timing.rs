//! Time calculation utilities for scroll animations
//!
//! Works on frame timestamps supplied by the host rather than wall-clock
//! instants, so the same animation replays identically in tests.

use std::time::Duration;

/// Calculate animation progress (0.0 to 1.0) from elapsed time and duration
///
/// # Returns
/// Progress value clamped to [0.0, 1.0]
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let ratio = elapsed.as_secs_f64() / duration.as_secs_f64();
    ratio.clamp(0.0, 1.0)
}

/// Check if animation is complete
#[inline]
pub fn is_complete(elapsed: Duration, duration: Duration) -> bool {
    elapsed >= duration
}

/// Linear interpolation between two values
///
/// # Arguments
/// * `from` - Start value
/// * `to` - End value
/// * `t` - Interpolation factor [0.0, 1.0]
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

/// Convert a host timestamp in milliseconds (e.g. `performance.now()`)
///
/// Negative or non-finite values map to zero.
pub fn timestamp_from_millis(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_secs_f64(ms / 1000.0)
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 100.0, 0.0) - 0.0).abs() < 0.001);
        assert!((lerp(0.0, 100.0, 0.5) - 50.0).abs() < 0.001);
        assert!((lerp(1200.0, 0.0, 1.0) - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_progress_zero_duration() {
        assert!((progress(Duration::ZERO, Duration::ZERO) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_progress_clamped() {
        let duration = Duration::from_millis(1000);
        assert_eq!(progress(Duration::from_millis(250), duration), 0.25);
        assert_eq!(progress(Duration::from_millis(5000), duration), 1.0);
        assert!(is_complete(Duration::from_millis(1000), duration));
        assert!(!is_complete(Duration::from_millis(999), duration));
    }

    #[test]
    fn test_timestamp_from_millis() {
        assert_eq!(timestamp_from_millis(1500.0), Duration::from_millis(1500));
        assert_eq!(timestamp_from_millis(-3.0), Duration::ZERO);
        assert_eq!(timestamp_from_millis(f64::NAN), Duration::ZERO);
    }
}
