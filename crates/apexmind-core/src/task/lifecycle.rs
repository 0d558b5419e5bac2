//! Status transitions and the completed-task expiry rule.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Task, TaskStatus};
use crate::clock::local_day;

/// What happens to completed tasks once their completion day is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Delete a done task once the calendar day after its completion begins.
    #[default]
    PurgeAfterCompletionDay,
    /// Keep completed tasks forever.
    Retain,
}

impl ExpiryPolicy {
    pub fn is_expired(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            ExpiryPolicy::Retain => false,
            ExpiryPolicy::PurgeAfterCompletionDay => {
                task.status() == TaskStatus::Done
                    && task
                        .completed_at()
                        .is_some_and(|at| local_day(at) < today)
            }
        }
    }
}

impl Task {
    /// Move to `status`, stamping or clearing `completed_at`.
    ///
    /// Entering `Done` stamps the completion time (again, if already done);
    /// leaving it clears the stamp. Returns the previous status.
    pub fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) -> TaskStatus {
        let previous = self.status;
        self.status = status;
        self.completed_at = match status {
            TaskStatus::Done => Some(now),
            TaskStatus::Todo | TaskStatus::InProgress => None,
        };
        self.updated_at = now;
        previous
    }

    /// Calendar-day match against the completion stamp.
    pub fn completed_on(&self, day: NaiveDate) -> bool {
        self.status == TaskStatus::Done && self.completed_at.is_some_and(|at| local_day(at) == day)
    }

    pub fn due_on(&self, day: NaiveDate) -> bool {
        self.due_date == Some(day)
    }
}
