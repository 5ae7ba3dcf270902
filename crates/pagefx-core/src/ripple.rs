//! Click ripple overlays

use tracing::trace;

use crate::config::RippleConfig;
use crate::dom::{px, ElementId, Page, Point, Rect};
use crate::scheduler::{Scheduler, Task};

/// Placement of a ripple relative to its host element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleGeometry {
    pub left: f64,
    pub top: f64,
    /// Diameter: the host's larger dimension
    pub size: f64,
}

impl RippleGeometry {
    /// Center the circle on `pointer`, or on the host center without one
    pub fn compute(rect: Rect, pointer: Option<Point>) -> Self {
        let size = rect.width.max(rect.height);
        let (x, y) = match pointer {
            Some(p) => (p.x - rect.left, p.y - rect.top),
            None => (rect.width / 2.0, rect.height / 2.0),
        };
        Self {
            left: x - size / 2.0,
            top: y - size / 2.0,
            size,
        }
    }
}

/// Spawns ripple overlays and schedules their removal
#[derive(Debug, Clone)]
pub struct RippleEffect {
    config: RippleConfig,
}

impl RippleEffect {
    pub fn new(config: RippleConfig) -> Self {
        Self { config }
    }

    /// Append a ripple to `host` and queue its removal after the lifetime
    pub fn spawn(
        &self,
        page: &mut dyn Page,
        tasks: &mut Scheduler<Task>,
        host: ElementId,
        pointer: Option<Point>,
    ) -> ElementId {
        let geometry = RippleGeometry::compute(page.bounding_rect(host), pointer);

        if page.style(host, "position").as_deref() != Some("relative") {
            page.set_style(host, "position", "relative");
        }
        if page.style(host, "overflow").as_deref() != Some("hidden") {
            page.set_style(host, "overflow", "hidden");
        }

        let lifetime = self.config.lifetime();
        let styles = [
            ("position", "absolute".to_string()),
            ("left", px(geometry.left)),
            ("top", px(geometry.top)),
            ("width", px(geometry.size)),
            ("height", px(geometry.size)),
            ("border-radius", "50%".to_string()),
            ("background", self.config.color.clone()),
            ("transform", "scale(0)".to_string()),
            ("animation", format!("ripple {}s linear", lifetime.as_secs_f64())),
            ("pointer-events", "none".to_string()),
            ("z-index", "1".to_string()),
        ];
        let ripple = page.append_overlay(host, &styles);
        tasks.schedule(lifetime, Task::RemoveNode(ripple));

        trace!(host = host.0, ripple = ripple.0, size = geometry.size, "Ripple spawned");
        ripple
    }
}
