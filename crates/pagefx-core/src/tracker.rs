//! Analytics event tracking
//!
//! Tracking is fire-and-forget: an event becomes a log line and, when a
//! listener is attached, a message on its channel. Nothing is retried or
//! stored.

use std::sync::mpsc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

/// A tracked analytics event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEvent {
    pub id: Uuid,
    pub name: String,
    pub payload: Map<String, Value>,
    pub at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct EventTracker {
    enabled: bool,
    event_tx: Option<mpsc::Sender<TrackedEvent>>,
}

impl EventTracker {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            event_tx: None,
        }
    }

    /// Forward every tracked event to `tx`
    pub fn with_sender(mut self, tx: mpsc::Sender<TrackedEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record an event; returns `None` when tracking is disabled
    pub fn track<I, K>(&self, name: &str, payload: I) -> Option<TrackedEvent>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        if !self.enabled {
            return None;
        }

        let event = TrackedEvent {
            id: Uuid::new_v4(),
            name: name.to_string(),
            payload: payload.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            at: Utc::now(),
        };
        let payload = Value::Object(event.payload.clone());
        info!(event = %event.name, payload = %payload, "Event tracked");
        self.send_event(&event);
        Some(event)
    }

    fn send_event(&self, event: &TrackedEvent) {
        if let Some(ref tx) = self.event_tx {
            if tx.send(event.clone()).is_err() {
                warn!("Failed to forward tracked event: receiver dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_track_builds_payload() {
        let tracker = EventTracker::new(true);
        let event = tracker
            .track(
                "social_media_click",
                [("platform", json!("instagram")), ("location", json!("navigation"))],
            )
            .unwrap();

        assert_eq!(event.name, "social_media_click");
        assert_eq!(event.payload["platform"], json!("instagram"));
        assert_eq!(event.payload.len(), 2);
    }

    #[test]
    fn test_disabled_tracker_is_silent() {
        let (tx, rx) = mpsc::channel();
        let tracker = EventTracker::new(false).with_sender(tx);
        assert!(tracker.track("button_click", Vec::<(String, Value)>::new()).is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_events_forwarded_to_listener() {
        let (tx, rx) = mpsc::channel();
        let tracker = EventTracker::new(true).with_sender(tx);
        let sent = tracker.track("page_performance", [("load_time", json!(420))]).unwrap();
        assert_eq!(rx.try_recv().unwrap(), sent);
    }

    #[test]
    fn test_dropped_receiver_still_succeeds() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let tracker = EventTracker::new(true).with_sender(tx);
        assert!(tracker.track("button_click", [("button_text", json!("Shop"))]).is_some());
    }
}
