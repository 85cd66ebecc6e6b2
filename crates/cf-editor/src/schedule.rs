//! Debounced recompute scheduling.
//!
//! Bursts of model-changed notifications (rapid drags, fast typing)
//! collapse into a single downstream recompute. Last write wins: only the
//! latest revision is ever delivered. The clock is caller-supplied, so the
//! whole thing is single-threaded and deterministic under test.

use std::time::{Duration, Instant};

/// Default delay before a pending recompute fires.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(100);

/// A cancellable deadline carrying the revision to recompute for.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
    pending_revision: Option<u64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            deadline: None,
            pending_revision: None,
        }
    }

    /// Record a model change. Any pending deadline is replaced — the
    /// timer restarts and the newer revision supersedes the older one.
    pub fn notify(&mut self, now: Instant, revision: u64) {
        self.deadline = Some(now + self.delay);
        self.pending_revision = Some(revision);
    }

    /// If the deadline has passed, take the pending revision. Call once
    /// per tick; returns `None` while waiting or when nothing is pending.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.pending_revision.take()
    }

    /// Drop any pending recompute.
    pub fn cancel(&mut self) {
        self.deadline = None;
        self.pending_revision = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fires_after_the_delay() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(100));
        d.notify(t0, 1);
        assert_eq!(d.poll(t0 + Duration::from_millis(50)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(100)), Some(1));
        // Consumed: nothing more to deliver.
        assert_eq!(d.poll(t0 + Duration::from_millis(200)), None);
    }

    #[test]
    fn burst_collapses_to_the_latest_revision() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        d.notify(t0, 1);
        d.notify(t0 + Duration::from_millis(30), 2);
        d.notify(t0 + Duration::from_millis(60), 3);
        // The timer restarted at t0+60; t0+100 is still too early.
        assert_eq!(d.poll(t0 + Duration::from_millis(100)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(160)), Some(3));
    }

    #[test]
    fn cancel_drops_the_pending_recompute() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        d.notify(t0, 7);
        assert!(d.is_pending());
        d.cancel();
        assert!(!d.is_pending());
        assert_eq!(d.poll(t0 + Duration::from_secs(1)), None);
    }
}
