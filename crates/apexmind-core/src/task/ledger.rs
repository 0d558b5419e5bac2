//! Per-task, per-day time ledger and day rollover detection.
//!
//! The ledger is a sparse time series: one bucket of seconds per local
//! calendar day, created on first write and never removed. Analytics reads
//! history from it directly.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tracked seconds keyed by calendar day (`YYYY-MM-DD` when serialized).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyLedger(BTreeMap<NaiveDate, u64>);

impl DailyLedger {
    /// Add `seconds` to `day`, creating the bucket at zero if needed.
    /// Returns the bucket's new value.
    pub fn add(&mut self, day: NaiveDate, seconds: u64) -> u64 {
        let bucket = self.0.entry(day).or_insert(0);
        *bucket = bucket.saturating_add(seconds);
        *bucket
    }

    /// Seconds tracked on `day`; zero for days with no activity.
    pub fn seconds_on(&self, day: NaiveDate) -> u64 {
        self.0.get(&day).copied().unwrap_or(0)
    }

    pub fn total_seconds(&self) -> u64 {
        self.0.values().sum()
    }

    /// Buckets within `from..=to`, oldest first. Empty if `from > to`.
    pub fn range(&self, from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.0
            .range(from.min(to)..=to)
            .filter(move |_| from <= to)
            .map(|(day, secs)| (*day, *secs))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, u64)> + '_ {
        self.0.iter().map(|(day, secs)| (*day, *secs))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Remembers the last observed calendar day and reports when it changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWatch {
    last_seen: NaiveDate,
}

impl DayWatch {
    pub fn new(today: NaiveDate) -> Self {
        Self { last_seen: today }
    }

    pub fn last_seen(&self) -> NaiveDate {
        self.last_seen
    }

    /// Record `today`. Returns the previous day if it differs.
    pub fn observe(&mut self, today: NaiveDate) -> Option<NaiveDate> {
        if today == self.last_seen {
            return None;
        }
        let previous = self.last_seen;
        self.last_seen = today;
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn add_creates_bucket_lazily() {
        let mut ledger = DailyLedger::default();
        assert_eq!(ledger.seconds_on(day(1)), 0);
        assert!(ledger.is_empty());
        assert_eq!(ledger.add(day(1), 60), 60);
        assert_eq!(ledger.add(day(1), 30), 90);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn past_days_are_retained() {
        let mut ledger = DailyLedger::default();
        ledger.add(day(1), 120);
        ledger.add(day(2), 45);
        assert_eq!(ledger.seconds_on(day(1)), 120);
        assert_eq!(ledger.seconds_on(day(2)), 45);
        assert_eq!(ledger.total_seconds(), 165);
    }

    #[test]
    fn range_is_inclusive_and_sparse() {
        let mut ledger = DailyLedger::default();
        ledger.add(day(1), 10);
        ledger.add(day(3), 30);
        ledger.add(day(5), 50);
        let got: Vec<_> = ledger.range(day(2), day(5)).collect();
        assert_eq!(got, vec![(day(3), 30), (day(5), 50)]);
    }

    #[test]
    fn day_watch_reports_change_once() {
        let mut watch = DayWatch::new(day(1));
        assert_eq!(watch.observe(day(1)), None);
        assert_eq!(watch.observe(day(2)), Some(day(1)));
        assert_eq!(watch.observe(day(2)), None);
        assert_eq!(watch.last_seen(), day(2));
    }

    proptest! {
        #[test]
        fn same_day_deltas_sum(deltas in proptest::collection::vec(0u64..10_000, 0..50)) {
            let mut ledger = DailyLedger::default();
            for d in &deltas {
                ledger.add(day(7), *d);
            }
            prop_assert_eq!(ledger.seconds_on(day(7)), deltas.iter().sum::<u64>());
        }
    }
}
