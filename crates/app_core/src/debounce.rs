//! Keyed debouncing
//!
//! A key fires once it has been requested continuously for the configured
//! delay. Keys dropped from the candidate set before then are cancelled.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer<K> {
    delay: Duration,
    pending: HashMap<K, Instant>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Mark `key` as a candidate. Repeated requests keep the original start time.
    pub fn request(&mut self, key: K, now: Instant) {
        self.pending.entry(key).or_insert(now);
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Cancel every pending key for which `keep` is false
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.pending.retain(|k, _| keep(k));
    }

    /// Remove and return keys whose delay has elapsed
    pub fn poll(&mut self, now: Instant) -> Vec<K> {
        let delay = self.delay;
        let ready: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, &since)| now.saturating_duration_since(since) >= delay)
            .map(|(k, _)| k.clone())
            .collect();

        for k in &ready {
            self.pending.remove(k);
        }
        ready
    }

    /// Earliest moment a pending key becomes ready
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().map(|&since| since + self.delay)
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_fires_after_delay() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.request("a", t0);
        assert!(d.poll(t0 + Duration::from_millis(299)).is_empty());
        assert_eq!(d.poll(t0 + DELAY), vec!["a"]);
        assert!(d.is_empty());
    }

    #[test]
    fn test_rerequest_keeps_start_time() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.request(1, t0);
        d.request(1, t0 + Duration::from_millis(200));
        assert_eq!(d.poll(t0 + DELAY), vec![1]);
    }

    #[test]
    fn test_superseded_keys_are_cancelled() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        d.request(1, t0);
        d.request(2, t0);
        d.retain(|k| *k == 2);
        assert!(!d.is_pending(&1));
        assert_eq!(d.poll(t0 + DELAY), vec![2]);

        // Coming back into view restarts the clock
        d.request(1, t0 + DELAY);
        assert!(d.poll(t0 + DELAY + Duration::from_millis(100)).is_empty());
    }

    #[test]
    fn test_next_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(DELAY);
        assert_eq!(d.next_deadline(), None);
        d.request("late", t0 + Duration::from_millis(50));
        d.request("early", t0);
        assert_eq!(d.next_deadline(), Some(t0 + DELAY));
        assert!(d.cancel(&"early"));
        assert!(!d.cancel(&"early"));
    }
}
