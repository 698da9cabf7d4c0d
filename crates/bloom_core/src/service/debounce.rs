//! Polled trailing-edge debouncer.
//!
//! # Invariants
//! - At most one pending key; a new trigger replaces key and deadline.
//! - A pending key fires once, on the first poll at or after its deadline.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Pending<K> {
    key: K,
    deadline: Instant,
}

/// Coalesces bursts of triggers into one firing per quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    delay: Duration,
    pending: Option<Pending<K>>,
}

impl<K: PartialEq> Debouncer<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules `key` to fire `delay` after `now`, resetting any earlier deadline.
    pub fn trigger(&mut self, key: K, now: Instant) {
        self.pending = Some(Pending {
            key,
            deadline: now + self.delay,
        });
    }

    /// Takes the pending key when its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<K> {
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.deadline);
        if due {
            self.take_pending()
        } else {
            None
        }
    }

    /// Takes the pending key regardless of its deadline.
    pub fn take_pending(&mut self) -> Option<K> {
        self.pending.take().map(|pending| pending.key)
    }

    /// Drops the pending firing if it belongs to `key`.
    pub fn cancel_if(&mut self, key: &K) -> bool {
        if self.pending_key() == Some(key) {
            self.pending = None;
            return true;
        }
        false
    }

    pub fn pending_key(&self) -> Option<&K> {
        self.pending.as_ref().map(|pending| &pending.key)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time left before the pending key is due.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending
            .as_ref()
            .map(|pending| pending.deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;
    use std::time::{Duration, Instant};

    #[test]
    fn retrigger_resets_deadline() {
        let start = Instant::now();
        let at = |ms: u64| start + Duration::from_millis(ms);
        let mut debouncer = Debouncer::new(Duration::from_millis(1500));

        debouncer.trigger("doc", at(0));
        debouncer.trigger("doc", at(1000));

        assert_eq!(debouncer.take_due(at(2000)), None);
        assert_eq!(debouncer.take_due(at(2499)), None);
        assert_eq!(debouncer.remaining(at(2499)), Some(Duration::from_millis(1)));
        assert_eq!(debouncer.take_due(at(2500)), Some("doc"));
        assert_eq!(debouncer.take_due(at(9000)), None);
    }

    #[test]
    fn cancel_only_matches_owner() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.trigger("a", now);

        assert!(!debouncer.cancel_if(&"b"));
        assert!(debouncer.is_pending());
        assert!(debouncer.cancel_if(&"a"));
        assert_eq!(debouncer.take_pending(), None);
    }
}
