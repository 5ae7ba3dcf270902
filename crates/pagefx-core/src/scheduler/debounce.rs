use std::time::Duration;

/// Trailing-edge debounce over the virtual clock
///
/// Each `trigger` pushes the deadline out by `wait`; `poll` reports true once,
/// after the deadline passes without a new trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    deadline: Option<Duration>,
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn trigger(&mut self, now: Duration) {
        self.deadline = Some(now + self.wait);
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let mut debounce = Debouncer::new(Duration::from_millis(100));
        debounce.trigger(Duration::from_millis(0));
        debounce.trigger(Duration::from_millis(60));

        assert!(!debounce.poll(Duration::from_millis(120)));
        assert!(debounce.poll(Duration::from_millis(160)));
        assert!(!debounce.poll(Duration::from_millis(400)));
    }

    #[test]
    fn test_cancel_clears_deadline() {
        let mut debounce = Debouncer::new(Duration::from_millis(100));
        debounce.trigger(Duration::ZERO);
        debounce.cancel();
        assert!(!debounce.is_pending());
        assert!(!debounce.poll(Duration::from_secs(1)));
    }
}
