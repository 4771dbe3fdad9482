use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::types::PredictionResult;

pub const HISTORY_CAPACITY: usize = 50;

/// Bounded log of recent predictions, oldest evicted first.
///
/// Append and eviction happen under one lock, so concurrent appends never
/// lose entries or overshoot the capacity. Readers get copies.
pub struct HistoryStore {
    capacity: usize,
    entries: Mutex<VecDeque<PredictionResult>>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Capacity is clamped to at least one entry.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn append(&self, result: PredictionResult) {
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(result);
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<PredictionResult> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn all(&self) -> Vec<PredictionResult> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoricalInput, PredictionSource};
    use std::sync::Arc;

    fn entry(ts: i64) -> PredictionResult {
        PredictionResult {
            input: CategoricalInput::resolve("Monday", "Spring", "East"),
            hourly: Vec::new(),
            source: PredictionSource::Fallback,
            base: 50.0,
            timestamp_ms: ts,
        }
    }

    #[test]
    fn test_evicts_oldest_beyond_capacity() {
        let store = HistoryStore::new();
        for i in 0..60 {
            store.append(entry(i));
        }
        let all = store.all();
        assert_eq!(all.len(), HISTORY_CAPACITY);
        assert_eq!(all.first().unwrap().timestamp_ms, 10);
        assert_eq!(all.last().unwrap().timestamp_ms, 59);
    }

    #[test]
    fn test_recent_returns_tail_in_order() {
        let store = HistoryStore::with_capacity(5);
        for i in 0..4 {
            store.append(entry(i));
        }
        let ts: Vec<i64> = store.recent(2).iter().map(|e| e.timestamp_ms).collect();
        assert_eq!(ts, vec![2, 3]);
        assert_eq!(store.recent(10).len(), 4);
        assert!(store.recent(0).is_empty());
    }

    #[test]
    fn test_concurrent_appends_respect_capacity() {
        let store = Arc::new(HistoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        store.append(entry(t * 100 + i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_empty_store() {
        let store = HistoryStore::default();
        assert!(store.is_empty());
        assert!(store.all().is_empty());
        assert_eq!(store.capacity(), HISTORY_CAPACITY);
    }
}
