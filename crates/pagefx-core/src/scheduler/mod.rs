//! Virtual-time task scheduler
//!
//! Timers are plain data queued against the host's frame clock. Every
//! scheduled task returns a [`TaskHandle`] that can cancel it before it fires.

mod debounce;

use std::time::Duration;

use crate::dom::ElementId;

pub use debounce::Debouncer;

/// Deferred engine work
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Clear the menu's open state once its exit animation has played
    FinishMenuClose,
    /// Detach an element (ripple overlay, loader)
    RemoveNode(ElementId),
    /// Staggered entrance: opacity 1, transform reset
    Reveal(ElementId),
    /// Start a named CSS animation on an element
    Animate {
        element: ElementId,
        animation: String,
    },
    /// Contact form: show the "sent" state
    FormSent { form: ElementId },
    /// Contact form: restore the button and reset the form
    FormRestore { form: ElementId },
}

/// Cancellation handle for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: u64,
    due: Duration,
    task: T,
}

/// Queue of tasks keyed by due time
#[derive(Debug, Clone)]
pub struct Scheduler<T = Task> {
    now: Duration,
    next_id: u64,
    queue: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queue `task` to fire `delay` after the current time
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.queue.push(Entry {
            id,
            due: self.now + delay,
            task,
        });
        TaskHandle(id)
    }

    /// Drop a pending task; returns false if it already fired or was cancelled
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.queue.len();
        self.queue.retain(|e| e.id != handle.0);
        self.queue.len() != before
    }

    pub fn is_pending(&self, handle: TaskHandle) -> bool {
        self.queue.iter().any(|e| e.id == handle.0)
    }

    /// Number of tasks still waiting
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.queue.iter().map(|e| e.due).min()
    }

    /// Move the clock to `now` (never backwards) and take every task due by then
    ///
    /// Tasks come out ordered by due time, then by scheduling order.
    pub fn advance(&mut self, now: Duration) -> Vec<T> {
        self.now = self.now.max(now);
        let now = self.now;

        let (mut due, waiting): (Vec<_>, Vec<_>) =
            self.queue.drain(..).partition(|e| e.due <= now);
        self.queue = waiting;

        due.sort_by_key(|e| (e.due, e.id));
        due.into_iter().map(|e| e.task).collect()
    }
}
