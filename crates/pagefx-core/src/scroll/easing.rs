//! Pure easing functions for scroll animations
//!
//! Each curve maps progress in [0, 1] to eased progress in [0, 1].

pub use crate::config::EasingType;

impl EasingType {
    /// Apply the easing function to a progress value
    ///
    /// # Arguments
    /// * `t` - Progress value, clamped to [0, 1]
    ///
    /// # Returns
    /// Eased value in range [0, 1]
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            EasingType::Linear => t,
            EasingType::InOutCubic => ease_in_out_cubic(t),
            EasingType::OutCubic => cubic_ease_out(t),
        }
    }
}

/// Cubic ease-in-out: 4t³ below the midpoint, 1 - (-2t + 2)³ / 2 above it
#[inline]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let tail = -2.0 * t + 2.0;
        1.0 - tail * tail * tail / 2.0
    }
}

/// Cubic ease-out: f(t) = 1 - (1-t)³
#[inline]
fn cubic_ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EasingType; 3] = [EasingType::Linear, EasingType::InOutCubic, EasingType::OutCubic];

    #[test]
    fn test_easing_boundaries() {
        for easing in ALL {
            assert!((easing.apply(0.0) - 0.0).abs() < 1e-12, "{:?} at t=0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12, "{:?} at t=1", easing);
        }
    }

    #[test]
    fn test_easing_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 0..=1000 {
                let t = i as f64 / 1000.0;
                let v = easing.apply(t);
                assert!(v >= prev, "{:?} not monotonic at t={}", easing, t);
                prev = v;
            }
        }
    }

    #[test]
    fn test_in_out_cubic_matches_reference_form() {
        // (t-1)(2t-2)(2t-2)+1 is the same upper half written differently
        for i in 50..=100 {
            let t = i as f64 / 100.0;
            let reference = (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0;
            assert!((ease_in_out_cubic(t) - reference).abs() < 1e-12, "t={}", t);
        }
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-12);
        assert!((ease_in_out_cubic(0.25) - 0.0625).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_progress_is_clamped() {
        assert_eq!(EasingType::InOutCubic.apply(-1.0), 0.0);
        assert_eq!(EasingType::InOutCubic.apply(2.0), 1.0);
    }
}
