use crashline_types::CrashRecord;
use std::collections::VecDeque;

/// Bounded list of finished rounds, most recent first.
#[derive(Clone, Debug)]
pub struct RoundHistory {
    capacity: usize,
    records: VecDeque<CrashRecord>,
}

impl RoundHistory {
    /// `capacity` must be non-zero; the state machine validates it before construction.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Record a finished round, evicting the oldest entry when full.
    pub fn record(&mut self, record: CrashRecord) {
        self.records.push_front(record);
        self.records.truncate(self.capacity);
    }

    /// Records from most recent to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &CrashRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&CrashRecord> {
        self.records.front()
    }

    pub fn crash_points(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.crash_point).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(round_id: u64) -> CrashRecord {
        CrashRecord {
            round_id,
            crash_point: 1.0 + round_id as f64,
        }
    }

    #[test]
    fn test_most_recent_first() {
        let mut history = RoundHistory::new(10);
        history.record(record(1));
        history.record(record(2));
        history.record(record(3));
        let ids: Vec<u64> = history.iter().map(|r| r.round_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(history.latest().map(|r| r.round_id), Some(3));
        assert_eq!(history.crash_points(), vec![4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        let mut history = RoundHistory::new(10);
        for id in 1..=25 {
            history.record(record(id));
            assert!(history.len() <= 10);
        }
        let ids: Vec<u64> = history.iter().map(|r| r.round_id).collect();
        assert_eq!(ids, (16..=25).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_history() {
        let history = RoundHistory::new(3);
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);
        assert!(history.crash_points().is_empty());
    }
}
