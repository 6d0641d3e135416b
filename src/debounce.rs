use std::time::{Duration, Instant};

/// Wait applied to scroll and resize notifications before closing a menu.
pub const DISMISS_DEBOUNCE: Duration = Duration::from_millis(10);

/// Coalesces bursts of notifications into one firing.
///
/// Each `notify` pushes the deadline out; `poll` fires once after the last
/// notification has been quiet for `wait`.
#[derive(Debug, Clone)]
pub struct Debouncer {
    wait: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DISMISS_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.wait);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// `true` exactly once per burst, when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(10));
        d.notify(start);
        d.notify(start + Duration::from_millis(5));
        d.notify(start + Duration::from_millis(8));
        assert!(!d.poll(start + Duration::from_millis(12)));
        assert!(d.poll(start + Duration::from_millis(18)));
        assert!(!d.poll(start + Duration::from_millis(40)));
    }

    #[test]
    fn cancel_clears_pending() {
        let start = Instant::now();
        let mut d = Debouncer::default();
        d.notify(start);
        assert!(d.is_pending());
        d.cancel();
        assert!(!d.poll(start + Duration::from_secs(1)));
    }
}
