//! Deterministic queue for deferred work.
//!
//! The engine never blocks: deferred scans and debounced announcements are
//! queued here against a virtual clock. [`Engine::advance`](crate::Engine::advance)
//! moves the clock by hand (tests), and
//! [`Engine::run_until_idle`](crate::Engine::run_until_idle) sleeps on the tokio
//! timer between deadlines.

use std::collections::BTreeMap;
use std::time::Duration;

/// A virtual-clock task queue. Tasks due at the same instant run in the order
/// they were scheduled.
pub struct Scheduler<T> {
    now: Duration,
    seq: u64,
    queue: BTreeMap<(Duration, u64), T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at time zero.
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Queue `task` to become due after `delay`. Returns its deadline.
    pub fn schedule(&mut self, delay: Duration, task: T) -> Duration {
        let deadline = self.now + delay;
        self.seq += 1;
        self.queue.insert((deadline, self.seq), task);
        deadline
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Time from now until the earliest deadline.
    pub fn next_delay(&self) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_sub(self.now))
    }

    /// Move the clock forward. The clock never runs backwards.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Remove and return the earliest task if it is due.
    pub fn pop_due(&mut self) -> Option<T> {
        let key = *self.queue.keys().next()?;
        if key.0 > self.now {
            return None;
        }
        self.queue.remove(&key)
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is pending.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }
}
