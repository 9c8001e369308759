//! Jump debounce
//!
//! After a jump impulse the character stays Jumping until its upward
//! velocity runs out. The check is a poll value owned by the character and
//! ticked from its update; clearing the field cancels it.

use tracing::debug;

/// Default seconds between apex checks
pub const DEFAULT_POLL_INTERVAL: f32 = 0.01;

/// A recurring check with a fixed interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebouncePoll {
    interval: f32,
    elapsed: f32,
}

impl DebouncePoll {
    pub fn new(interval: f32) -> Self {
        Self { interval, elapsed: 0.0 }
    }

    /// Advance by `dt`. Returns true when a check is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone)]
pub struct JumpController {
    interval: f32,
    poll: Option<DebouncePoll>,
}

impl Default for JumpController {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl JumpController {
    pub fn new(interval: f32) -> Self {
        Self { interval, poll: None }
    }

    pub fn is_armed(&self) -> bool {
        self.poll.is_some()
    }

    /// Start watching for the apex. Replaces any poll already armed.
    pub fn arm(&mut self) {
        if self.poll.is_some() {
            debug!("replacing armed jump poll");
        }
        self.poll = Some(DebouncePoll::new(self.interval));
    }

    /// Returns true if a poll was armed.
    pub fn disarm(&mut self) -> bool {
        self.poll.take().is_some()
    }

    /// Advance the poll. `descending` is only evaluated when a check is due.
    /// Returns true once the apex is observed; the poll disarms itself.
    pub fn tick(&mut self, dt: f32, descending: impl FnOnce() -> bool) -> bool {
        let Some(poll) = self.poll.as_mut() else {
            return false;
        };
        if poll.tick(dt) && descending() {
            self.poll = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_interval() {
        let mut poll = DebouncePoll::new(0.01);
        assert!(!poll.tick(0.004));
        assert!(!poll.tick(0.004));
        assert!(poll.tick(0.004));
        assert!(poll.tick(1.0 / 60.0));
    }

    #[test]
    fn test_fires_once_on_descent() {
        let mut jump = JumpController::default();
        jump.arm();

        assert!(!jump.tick(1.0 / 60.0, || false));
        assert!(jump.is_armed());
        assert!(jump.tick(1.0 / 60.0, || true));
        assert!(!jump.is_armed());
        assert!(!jump.tick(1.0 / 60.0, || true));
    }

    #[test]
    fn test_unarmed_never_checks() {
        let mut jump = JumpController::default();
        assert!(!jump.tick(1.0, || panic!("checked without a jump")));
        assert!(!jump.disarm());
    }

    #[test]
    fn test_rearm_replaces_poll() {
        let mut jump = JumpController::new(0.05);
        jump.arm();
        assert!(!jump.tick(0.04, || true));
        jump.arm();
        // Elapsed time restarted with the new poll
        assert!(!jump.tick(0.04, || true));
        assert!(jump.tick(0.04, || true));
    }
}
