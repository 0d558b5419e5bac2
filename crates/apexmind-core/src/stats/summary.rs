use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskStatus};

/// Task counts by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub todo: usize,
}

/// A task's tracked time today, in whole minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntry {
    pub task_id: String,
    pub title: String,
    pub minutes: u64,
}

pub fn summarize(tasks: &[Task]) -> TaskSummary {
    tasks.iter().fold(
        TaskSummary {
            total: tasks.len(),
            ..TaskSummary::default()
        },
        |mut acc, task| {
            match task.status() {
                TaskStatus::Done => acc.done += 1,
                TaskStatus::InProgress => acc.in_progress += 1,
                TaskStatus::Todo => acc.todo += 1,
            }
            acc
        },
    )
}

/// Tasks with time tracked on `today`, most minutes first, at most `limit`.
///
/// Minutes are rounded to nearest. Ties keep store order.
pub fn top_tracked(tasks: &[Task], today: NaiveDate, limit: usize) -> Vec<TrackedEntry> {
    let mut entries: Vec<TrackedEntry> = tasks
        .iter()
        .filter_map(|task| {
            let secs = task.time_tracked(today);
            (secs > 0).then(|| TrackedEntry {
                task_id: task.id.clone(),
                title: task.title.clone(),
                minutes: (secs + 30) / 60,
            })
        })
        .collect();
    entries.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    entries.truncate(limit);
    entries
}

/// `1h 5m` from one hour up, otherwise `5m`.
pub fn format_tracked(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    if hrs > 0 {
        format!("{hrs}h {mins}m")
    } else {
        format!("{mins}m")
    }
}
