//! Single scroll sampling point
//!
//! Scroll events only mark the coordinator dirty. On the next animation frame
//! it reads the scroll position once and fans the sample out to every
//! subscriber in registration order.

use std::time::Duration;

use tracing::trace;

use crate::dom::Page;
use crate::scheduler::{Debouncer, Scheduler, Task};

/// Scroll state shared by all subscribers for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    /// Current vertical scroll offset
    pub y: f64,
    /// Offset seen by the previous dispatch
    pub previous_y: f64,
    pub viewport_height: f64,
    pub timestamp: Duration,
}

impl ScrollFrame {
    #[inline]
    pub fn scrolling_down(&self) -> bool {
        self.y > self.previous_y
    }
}

/// Something that recomputes presentation state from the scroll position
pub trait ScrollSubscriber {
    /// Short label used in logs
    fn name(&self) -> &'static str;

    fn on_scroll(&mut self, frame: &ScrollFrame, page: &mut dyn Page, tasks: &mut Scheduler<Task>);
}

pub struct ScrollCoordinator {
    subscribers: Vec<Box<dyn ScrollSubscriber>>,
    dirty: bool,
    last_y: f64,
    debounce: Option<Debouncer>,
    dispatches: u64,
}

impl ScrollCoordinator {
    pub fn new(debounce: Option<Duration>) -> Self {
        Self {
            subscribers: Vec::new(),
            dirty: false,
            last_y: 0.0,
            debounce: debounce.map(Debouncer::new),
            dispatches: 0,
        }
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn ScrollSubscriber>) {
        trace!(subscriber = subscriber.name(), "Scroll subscriber registered");
        self.subscribers.push(subscriber);
    }

    pub fn subscriber_names(&self) -> Vec<&'static str> {
        self.subscribers.iter().map(|s| s.name()).collect()
    }

    /// Record a scroll event; work happens on the next frame
    pub fn notify_scroll(&mut self, now: Duration) {
        self.dirty = true;
        if let Some(debounce) = self.debounce.as_mut() {
            debounce.trigger(now);
        }
    }

    /// Ask for a dispatch on the next frame without touching the debounce window
    pub fn request_pass(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Offset seen by the most recent dispatch
    pub fn last_y(&self) -> f64 {
        self.last_y
    }

    /// Total dispatches so far
    pub fn dispatches(&self) -> u64 {
        self.dispatches
    }

    /// Run subscribers if a scroll happened since the last dispatch
    ///
    /// Returns true when subscribers ran this frame.
    pub fn on_frame(
        &mut self,
        now: Duration,
        page: &mut dyn Page,
        tasks: &mut Scheduler<Task>,
    ) -> bool {
        if !self.dirty {
            return false;
        }
        if let Some(debounce) = self.debounce.as_mut() {
            if debounce.is_pending() && !debounce.poll(now) {
                return false;
            }
        }

        self.dirty = false;
        let frame = ScrollFrame {
            y: page.scroll_y(),
            previous_y: self.last_y,
            viewport_height: page.viewport_height(),
            timestamp: now,
        };
        for subscriber in self.subscribers.iter_mut() {
            subscriber.on_scroll(&frame, page, tasks);
        }
        self.last_y = frame.y;
        self.dispatches += 1;
        true
    }
}

impl std::fmt::Debug for ScrollCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollCoordinator")
            .field("subscribers", &self.subscriber_names())
            .field("dirty", &self.dirty)
            .field("last_y", &self.last_y)
            .field("dispatches", &self.dispatches)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::dom::MemoryPage;

    struct Recorder(Rc<RefCell<Vec<ScrollFrame>>>);

    impl ScrollSubscriber for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        fn on_scroll(&mut self, frame: &ScrollFrame, _: &mut dyn Page, _: &mut Scheduler<Task>) {
            self.0.borrow_mut().push(*frame);
        }
    }

    fn setup(debounce: Option<Duration>) -> (ScrollCoordinator, Rc<RefCell<Vec<ScrollFrame>>>, MemoryPage) {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = ScrollCoordinator::new(debounce);
        coordinator.subscribe(Box::new(Recorder(frames.clone())));
        let page = MemoryPage::new(800.0).with_document_height(5000.0);
        (coordinator, frames, page)
    }

    #[test]
    fn test_many_scroll_events_one_sample_per_frame() {
        let (mut coordinator, frames, mut page) = setup(None);
        let mut tasks = Scheduler::new();

        for y in [100.0, 200.0, 300.0] {
            page.scroll_to(y);
            coordinator.notify_scroll(Duration::ZERO);
        }
        assert!(coordinator.on_frame(Duration::from_millis(16), &mut page, &mut tasks));
        assert!(!coordinator.on_frame(Duration::from_millis(32), &mut page, &mut tasks));

        let frames = frames.borrow();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].y, 300.0);
        assert_eq!(frames[0].previous_y, 0.0);
        assert!(frames[0].scrolling_down());
    }

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let (mut coordinator, frames, mut page) = setup(Some(Duration::from_millis(100)));
        let mut tasks = Scheduler::new();

        page.scroll_to(400.0);
        coordinator.notify_scroll(Duration::from_millis(0));
        assert!(!coordinator.on_frame(Duration::from_millis(16), &mut page, &mut tasks));
        coordinator.notify_scroll(Duration::from_millis(50));
        assert!(!coordinator.on_frame(Duration::from_millis(120), &mut page, &mut tasks));
        assert!(coordinator.on_frame(Duration::from_millis(150), &mut page, &mut tasks));
        assert_eq!(frames.borrow().len(), 1);
    }

    #[test]
    fn test_request_pass_bypasses_debounce() {
        let (mut coordinator, frames, mut page) = setup(Some(Duration::from_millis(100)));
        let mut tasks = Scheduler::new();

        coordinator.request_pass();
        assert!(coordinator.on_frame(Duration::ZERO, &mut page, &mut tasks));
        assert_eq!(frames.borrow().len(), 1);
    }
}
