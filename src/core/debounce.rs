//! # Debounced Dispatcher
//!
//! Keyed deferred callbacks for a single-threaded event loop.
//!
//! Nothing here sleeps. Work is queued with a deadline and handed back by
//! [`DebouncedDispatcher::drain_due`] once the caller's clock passes it, so
//! the owner decides what "firing" means and tests can drive time directly.
//!
//! - [`call`](DebouncedDispatcher::call) debounces: a pending entry with the
//!   same key is replaced and its deadline pushed out.
//! - [`defer`](DebouncedDispatcher::defer) schedules with an explicit delay
//!   (used for retry backoff). Same-key replacement applies as well.
//! - [`cancel_all`](DebouncedDispatcher::cancel_all) is the teardown hook.
//!   Owners call it on unmount so nothing fires into a dead component.

use std::time::{Duration, Instant};

struct Pending<K, T> {
    key: K,
    deadline: Instant,
    seq: u64,
    payload: T,
}

pub struct DebouncedDispatcher<K, T> {
    delay: Duration,
    pending: Vec<Pending<K, T>>,
    seq: u64,
}

impl<K: PartialEq, T> DebouncedDispatcher<K, T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Vec::new(),
            seq: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Debounced call using the dispatcher's default delay.
    pub fn call(&mut self, key: K, payload: T, now: Instant) {
        let delay = self.delay;
        self.defer(key, payload, now, delay);
    }

    /// Schedule `payload` under `key` to fire `delay` after `now`.
    pub fn defer(&mut self, key: K, payload: T, now: Instant, delay: Duration) {
        self.cancel(&key);
        self.seq += 1;
        self.pending.push(Pending {
            key,
            deadline: now + delay,
            seq: self.seq,
            payload,
        });
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.key != *key);
        self.pending.len() != before
    }

    /// Drop everything pending. Returns how many entries were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.iter().any(|p| p.key == *key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Remove and return every entry whose deadline is at or before `now`,
    /// ordered by deadline and then by scheduling order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<(K, T)> {
        let (mut due, keep): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.deadline <= now);
        self.pending = keep;
        due.sort_by_key(|p| (p.deadline, p.seq));
        due.into_iter().map(|p| (p.key, p.payload)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_nothing_fires_before_deadline() {
        let t0 = Instant::now();
        let mut dispatcher = DebouncedDispatcher::new(ms(250));
        dispatcher.call("viewable", 1, t0);

        assert!(dispatcher.drain_due(t0 + ms(249)).is_empty());
        assert_eq!(dispatcher.drain_due(t0 + ms(250)), vec![("viewable", 1)]);
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_repeat_calls_collapse_to_last_payload() {
        let t0 = Instant::now();
        let mut dispatcher = DebouncedDispatcher::new(ms(250));
        dispatcher.call("focus", "A", t0);
        dispatcher.call("focus", "B", t0 + ms(100));
        dispatcher.call("focus", "C", t0 + ms(200));

        // The deadline moved with every call.
        assert!(dispatcher.drain_due(t0 + ms(300)).is_empty());
        assert_eq!(dispatcher.drain_due(t0 + ms(450)), vec![("focus", "C")]);
    }

    #[test]
    fn test_distinct_keys_fire_in_deadline_order() {
        let t0 = Instant::now();
        let mut dispatcher = DebouncedDispatcher::new(ms(250));
        dispatcher.defer("retry", 1, t0, ms(500));
        dispatcher.defer("settle", 2, t0, ms(200));
        dispatcher.call("viewable", 3, t0);

        let fired: Vec<_> = dispatcher
            .drain_due(t0 + ms(600))
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(fired, vec!["settle", "viewable", "retry"]);
    }

    #[test]
    fn test_cancel_all_on_teardown() {
        let t0 = Instant::now();
        let mut dispatcher = DebouncedDispatcher::new(ms(10));
        dispatcher.call(1, (), t0);
        dispatcher.call(2, (), t0);

        assert_eq!(dispatcher.cancel_all(), 2);
        assert!(dispatcher.drain_due(t0 + ms(1_000)).is_empty());
    }

    #[test]
    fn test_cancel_single_key() {
        let t0 = Instant::now();
        let mut dispatcher = DebouncedDispatcher::new(ms(10));
        dispatcher.call(1, (), t0);
        dispatcher.call(2, (), t0);

        assert!(dispatcher.cancel(&1));
        assert!(!dispatcher.cancel(&1));
        assert!(dispatcher.is_pending(&2));
        assert_eq!(dispatcher.next_deadline(), Some(t0 + ms(10)));
    }
}
