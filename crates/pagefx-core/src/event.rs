//! Host events delivered to the engine

use std::time::Duration;

use crate::dom::{ElementId, Point};

/// Keyboard keys the engine reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Tab,
    Other(String),
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Key::Escape,
            "Tab" => Key::Tab,
            other => Key::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// The document scrolled
    Scroll { timestamp: Duration },
    /// Animation frame callback
    Frame { timestamp: Duration },
    Click {
        target: ElementId,
        /// Viewport coordinates, when the click came from a pointer
        pointer: Option<Point>,
    },
    KeyDown { key: Key, shift: bool },
    TouchStart { target: ElementId, y: f64 },
    TouchMove { target: ElementId, y: f64 },
    TouchEnd { target: ElementId },
    PointerEnter(ElementId),
    PointerLeave(ElementId),
    /// Window load finished
    Load { load_time_ms: f64 },
    Submit(ElementId),
    /// Uncaught runtime error reported by the host
    Error { message: String },
}

/// What the host should do after dispatching an event
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub prevent_default: bool,
}

impl EventOutcome {
    pub fn prevent_default() -> Self {
        Self {
            prevent_default: true,
        }
    }

    pub fn merge(self, other: EventOutcome) -> Self {
        Self {
            prevent_default: self.prevent_default || other.prevent_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_dom_name() {
        assert_eq!(Key::from("Escape"), Key::Escape);
        assert_eq!(Key::from("Tab"), Key::Tab);
        assert_eq!(Key::from("Enter"), Key::Other("Enter".to_string()));
    }

    #[test]
    fn test_outcome_merge() {
        let outcome = EventOutcome::default().merge(EventOutcome::prevent_default());
        assert!(outcome.prevent_default);
        assert!(!EventOutcome::default().merge(EventOutcome::default()).prevent_default);
    }
}
