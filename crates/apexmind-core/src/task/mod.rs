//! Tasks, their status lifecycle and their per-day time ledger.
//!
//! A [`Task`] owns a [`DailyLedger`] of tracked seconds keyed by local
//! calendar day. The time tracked "today" is always read from that ledger,
//! so there is no cached counter to keep in sync across day boundaries.

pub mod ledger;
pub mod lifecycle;
mod store;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use ledger::{DailyLedger, DayWatch};
pub use lifecycle::ExpiryPolicy;
pub use store::{NewTask, TaskPatch, TaskStore};

/// Task status.
///
/// Any status may move to any other; there is no forward-only constraint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Todo => write!(f, "todo"),
            TaskStatus::InProgress => write!(f, "inProgress"),
            TaskStatus::Done => write!(f, "done"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "inprogress" | "doing" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(ValidationError::InvalidValue {
                field: "status".into(),
                message: format!("expected todo, in-progress or done, got '{s}'"),
            }),
        }
    }
}

/// Task priority. Informational only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("expected low, medium or high, got '{s}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubTask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

/// A tracked task.
///
/// `status` and `completed_at` only change together through
/// [`Task::set_status`], and the ledger only grows through
/// [`Task::record_time`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier, generated by the caller
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub labels: BTreeSet<String>,
    #[serde(default)]
    pub subtasks: Vec<SubTask>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Set if and only if `status` is `Done`
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
    /// Tracked seconds per local calendar day
    #[serde(default)]
    daily_time_tracked: DailyLedger,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a `Todo` task with an empty ledger.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(Task {
            id: id.into(),
            title,
            description: None,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            labels: BTreeSet::new(),
            subtasks: Vec::new(),
            due_date: None,
            completed_at: None,
            daily_time_tracked: DailyLedger::default(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn ledger(&self) -> &DailyLedger {
        &self.daily_time_tracked
    }

    /// Seconds tracked on `today`.
    pub fn time_tracked(&self, today: NaiveDate) -> u64 {
        self.daily_time_tracked.seconds_on(today)
    }

    /// Credit `seconds` to the bucket for `day`. Returns the new bucket value.
    pub fn record_time(&mut self, day: NaiveDate, seconds: u64, now: DateTime<Utc>) -> u64 {
        let total = self.daily_time_tracked.add(day, seconds);
        self.updated_at = now;
        total
    }

    pub fn add_subtask(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        self.subtasks.push(SubTask {
            id: id.into(),
            title,
            completed: false,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Flip a subtask's completion flag. Returns false if it doesn't exist.
    pub fn toggle_subtask(&mut self, subtask_id: &str, now: DateTime<Utc>) -> bool {
        match self.subtasks.iter_mut().find(|s| s.id == subtask_id) {
            Some(sub) => {
                sub.completed = !sub.completed;
                self.updated_at = now;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn new_task_rejects_blank_title() {
        assert_eq!(Task::new("a", "   ", t0()), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn new_task_starts_todo_with_empty_ledger() {
        let task = Task::new("a", "Write report", t0()).unwrap();
        assert_eq!(task.status(), TaskStatus::Todo);
        assert!(task.completed_at().is_none());
        assert!(task.ledger().is_empty());
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn status_parses_common_spellings() {
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("inProgress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("DONE".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("archived".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn status_serializes_camel_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"inProgress\"");
    }

    #[test]
    fn toggle_subtask_flips_flag() {
        let mut task = Task::new("a", "Write report", t0()).unwrap();
        task.add_subtask("s1", "Outline", t0()).unwrap();
        assert!(task.toggle_subtask("s1", t0()));
        assert!(task.subtasks[0].completed);
        assert!(!task.toggle_subtask("missing", t0()));
    }

    #[test]
    fn task_json_roundtrip_keeps_ledger() {
        let mut task = Task::new("a", "Write report", t0()).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        task.record_time(day, 120, t0());
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"2024-01-01\":120"));
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.time_tracked(day), 120);
    }
}
