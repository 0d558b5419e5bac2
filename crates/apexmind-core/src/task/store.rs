use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ExpiryPolicy, Priority, Task, TaskStatus};
use crate::error::ValidationError;

/// Fields a caller supplies when creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub labels: BTreeSet<String>,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Editable task fields. `None` leaves a field as it is.
///
/// Status and tracked time have their own operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub labels: Option<BTreeSet<String>>,
    pub due_date: Option<Option<NaiveDate>>,
}

/// The ordered set of tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl From<Vec<Task>> for TaskStore {
    fn from(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Create and append a task.
    pub fn create(
        &mut self,
        id: impl Into<String>,
        new: NewTask,
        now: DateTime<Utc>,
    ) -> Result<&Task, ValidationError> {
        let id = id.into();
        if self.get(&id).is_some() {
            return Err(ValidationError::InvalidValue {
                field: "id".into(),
                message: format!("task '{id}' already exists"),
            });
        }
        let mut task = Task::new(id, new.title, now)?;
        task.description = new.description;
        task.priority = new.priority;
        task.labels = new.labels;
        task.due_date = new.due_date;
        let index = self.tasks.len();
        self.tasks.push(task);
        Ok(&self.tasks[index])
    }

    /// Apply a patch. Returns `Ok(false)` if the task doesn't exist.
    pub fn update(
        &mut self,
        id: &str,
        patch: TaskPatch,
        now: DateTime<Utc>,
    ) -> Result<bool, ValidationError> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ValidationError::EmptyTitle);
        }
        let Some(task) = self.get_mut(id) else {
            debug!(task_id = id, "update for unknown task ignored");
            return Ok(false);
        };
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(labels) = patch.labels {
            task.labels = labels;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        task.updated_at = now;
        Ok(true)
    }

    /// Remove a task. Returns the removed task, if any.
    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Change a task's status. Returns the previous status, or `None` if the
    /// task doesn't exist.
    pub fn set_status(
        &mut self,
        id: &str,
        status: TaskStatus,
        now: DateTime<Utc>,
    ) -> Option<TaskStatus> {
        let task = self.get_mut(id)?;
        Some(task.set_status(status, now))
    }

    /// Credit `seconds` to the task's bucket for `today`.
    ///
    /// Returns the bucket's new value. Unknown ids are a silent no-op.
    pub fn add_time(
        &mut self,
        id: &str,
        seconds: u64,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Option<u64> {
        match self.get_mut(id) {
            Some(task) => Some(task.record_time(today, seconds, now)),
            None => {
                debug!(task_id = id, seconds, "ledger write for unknown task dropped");
                None
            }
        }
    }

    pub fn add_subtask(
        &mut self,
        task_id: &str,
        subtask_id: impl Into<String>,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<bool, ValidationError> {
        match self.get_mut(task_id) {
            Some(task) => task.add_subtask(subtask_id, title, now).map(|_| true),
            None => Ok(false),
        }
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str, now: DateTime<Utc>) -> bool {
        self.get_mut(task_id)
            .is_some_and(|task| task.toggle_subtask(subtask_id, now))
    }

    /// Delete every task the policy considers expired. Returns their ids.
    pub fn sweep_expired(&mut self, policy: ExpiryPolicy, today: NaiveDate) -> Vec<String> {
        let mut removed = Vec::new();
        self.tasks.retain(|task| {
            if policy.is_expired(task, today) {
                removed.push(task.id.clone());
                false
            } else {
                true
            }
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn store_with(ids: &[&str], now: DateTime<Utc>) -> TaskStore {
        let mut store = TaskStore::new();
        for id in ids {
            store.create(*id, NewTask::titled(format!("Task {id}")), now).unwrap();
        }
        store
    }

    #[test]
    fn add_time_sums_into_today() {
        let now = local(2024, 1, 1, 9);
        let mut store = store_with(&["a"], now);
        for delta in [60, 61, 5] {
            store.add_time("a", delta, jan(1), now);
        }
        let task = store.get("a").unwrap();
        assert_eq!(task.time_tracked(jan(1)), 126);
        assert_eq!(task.ledger().seconds_on(jan(1)), 126);
    }

    #[test]
    fn rollover_reads_zero_for_new_day_and_keeps_history() {
        let now = local(2024, 1, 1, 9);
        let mut store = store_with(&["a"], now);
        store.add_time("a", 120, jan(1), now);
        let task = store.get("a").unwrap();
        assert_eq!(task.time_tracked(jan(2)), 0);
        assert_eq!(task.ledger().seconds_on(jan(1)), 120);
    }

    #[test]
    fn add_time_to_unknown_task_changes_nothing() {
        let now = local(2024, 1, 1, 9);
        let mut store = store_with(&["a"], now);
        let before = store.clone();
        assert_eq!(store.add_time("ghost", 60, jan(1), now), None);
        assert_eq!(store, before);
    }

    #[test]
    fn create_rejects_duplicate_id_and_blank_title() {
        let now = local(2024, 1, 1, 9);
        let mut store = store_with(&["a"], now);
        assert!(store.create("a", NewTask::titled("Again"), now).is_err());
        assert_eq!(
            store.create("b", NewTask::titled(""), now).unwrap_err(),
            ValidationError::EmptyTitle
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn create_returns_the_appended_task() {
        let now = local(2024, 1, 1, 9);
        let mut store = store_with(&["a", "b"], now);
        let task = store.create("c", NewTask::titled("Third"), now).unwrap();
        assert_eq!(task.id, "c");
        assert_eq!(task.title, "Third");
        assert_eq!(store.as_slice().last().map(|t| t.id.as_str()), Some("c"));
    }

    #[test]
    fn update_keeps_ledger_and_status() {
        let now = local(2024, 1, 1, 9);
        let mut store = store_with(&["a"], now);
        store.add_time("a", 300, jan(1), now);
        store.set_status("a", TaskStatus::InProgress, now);
        let later = now + Duration::minutes(1);
        let patch = TaskPatch {
            title: Some("Renamed".into()),
            priority: Some(Priority::High),
            due_date: Some(Some(jan(3))),
            ..TaskPatch::default()
        };
        assert!(store.update("a", patch, later).unwrap());
        let task = store.get("a").unwrap();
        assert_eq!(task.title, "Renamed");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, Some(jan(3)));
        assert_eq!(task.status(), TaskStatus::InProgress);
        assert_eq!(task.time_tracked(jan(1)), 300);
        assert_eq!(task.updated_at, later);
    }

    #[test]
    fn update_unknown_task_is_noop() {
        let now = local(2024, 1, 1, 9);
        let mut store = store_with(&["a"], now);
        assert!(!store.update("ghost", TaskPatch::default(), now).unwrap());
    }

    #[test]
    fn set_status_keeps_completion_invariant() {
        let now = local(2024, 1, 1, 9);
        let mut store = store_with(&["a", "b"], now);
        store.set_status("a", TaskStatus::Done, now);
        store.set_status("b", TaskStatus::Done, now);
        store.set_status("b", TaskStatus::Todo, now);
        assert_eq!(store.set_status("ghost", TaskStatus::Done, now), None);
        for task in store.as_slice() {
            assert_eq!(task.status() == TaskStatus::Done, task.completed_at().is_some());
        }
    }

    #[test]
    fn sweep_removes_yesterdays_done_tasks_only() {
        let mut store = store_with(&["old", "fresh", "open"], local(2024, 1, 1, 8));
        store.set_status("old", TaskStatus::Done, local(2024, 1, 1, 18));
        store.set_status("fresh", TaskStatus::Done, local(2024, 1, 2, 9));

        let removed = store.sweep_expired(ExpiryPolicy::PurgeAfterCompletionDay, jan(2));
        assert_eq!(removed, vec!["old".to_string()]);
        assert!(store.get("old").is_none());
        assert!(store.get("fresh").is_some());
        assert!(store.get("open").is_some());
    }

    #[test]
    fn sweep_with_retain_policy_keeps_everything() {
        let mut store = store_with(&["old"], local(2024, 1, 1, 8));
        store.set_status("old", TaskStatus::Done, local(2024, 1, 1, 18));
        assert!(store.sweep_expired(ExpiryPolicy::Retain, jan(5)).is_empty());
        assert_eq!(store.len(), 1);
    }
}
