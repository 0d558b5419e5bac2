use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::local_day;
use crate::task::{Task, TaskStatus};

/// Completed-task count for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Seconds tracked across all tasks on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotal {
    pub date: NaiveDate,
    pub seconds: u64,
}

/// One entry per day in `from..=to` counting done tasks whose last update
/// falls on that day. Days without completions have a zero count.
pub fn completion_heatmap(tasks: &[Task], from: NaiveDate, to: NaiveDate) -> Vec<DayCount> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for task in tasks.iter().filter(|t| t.status() == TaskStatus::Done) {
        *counts.entry(local_day(task.updated_at)).or_insert(0) += 1;
    }
    days(from, to)
        .map(|date| DayCount {
            date,
            count: counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

/// One entry per day in `from..=to` summing every task's ledger bucket.
pub fn daily_totals(tasks: &[Task], from: NaiveDate, to: NaiveDate) -> Vec<DayTotal> {
    let mut totals: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for task in tasks {
        for (date, secs) in task.ledger().range(from, to) {
            *totals.entry(date).or_insert(0) += secs;
        }
    }
    days(from, to)
        .map(|date| DayTotal {
            date,
            seconds: totals.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

fn days(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone, Utc};

    fn local(d: u32, h: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2024, 1, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn heatmap_counts_done_tasks_per_day() {
        let mut a = Task::new("a", "A", local(1, 9)).unwrap();
        a.set_status(TaskStatus::Done, local(2, 10));
        let mut b = Task::new("b", "B", local(1, 9)).unwrap();
        b.set_status(TaskStatus::Done, local(2, 15));
        let mut c = Task::new("c", "C", local(1, 9)).unwrap();
        c.set_status(TaskStatus::InProgress, local(3, 9));

        let map = completion_heatmap(&[a, b, c], jan(1), jan(3));
        let counts: Vec<_> = map.iter().map(|d| d.count).collect();
        assert_eq!(counts, vec![0, 2, 0]);
    }

    #[test]
    fn daily_totals_sum_ledgers_and_fill_gaps() {
        let mut a = Task::new("a", "A", local(1, 9)).unwrap();
        a.record_time(jan(1), 120, local(1, 9));
        a.record_time(jan(3), 60, local(3, 9));
        let mut b = Task::new("b", "B", local(1, 9)).unwrap();
        b.record_time(jan(1), 30, local(1, 9));

        let totals = daily_totals(&[a, b], jan(1), jan(3));
        let secs: Vec<_> = totals.iter().map(|d| d.seconds).collect();
        assert_eq!(secs, vec![150, 0, 60]);
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(daily_totals(&[], jan(3), jan(1)).is_empty());
    }
}
