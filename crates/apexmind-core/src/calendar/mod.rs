//! Read-only calendar projection over tasks.
//!
//! A task shows up on a day if it was completed that day or is due that day.
//! Matching is by local calendar day, never by exact timestamp.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::task::Task;

/// One cell of a month grid.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub is_today: bool,
    pub tasks: Vec<&'a Task>,
}

/// Tasks relevant to `date`: done tasks completed that day plus tasks due
/// that day regardless of status. Store order is preserved.
pub fn tasks_for_date(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| task.completed_on(date) || task.due_on(date))
        .collect()
}

/// Every day of `year`-`month` with its tasks. `None` for an invalid month.
pub fn month_view(tasks: &[Task], year: i32, month: u32, today: NaiveDate) -> Option<Vec<CalendarDay<'_>>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| CalendarDay {
            date,
            is_today: date == today,
            tasks: tasks_for_date(tasks, date),
        })
        .collect();
    Some(days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;
    use chrono::{DateTime, Local, TimeZone, Utc};

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn projects_completed_and_due_tasks() {
        let now = local(2024, 2, 1, 9);
        let mut done = Task::new("done", "Done on the 5th", now).unwrap();
        done.set_status(TaskStatus::Done, local(2024, 2, 5, 17));
        let mut due = Task::new("due", "Due on the 5th", now).unwrap();
        due.due_date = Some(date(2, 5));
        let mut due_done = Task::new("due-done", "Due 5th, done 3rd", now).unwrap();
        due_done.due_date = Some(date(2, 5));
        due_done.set_status(TaskStatus::Done, local(2024, 2, 3, 12));
        let unrelated = Task::new("other", "No dates", now).unwrap();

        let tasks = vec![done, due, due_done, unrelated];
        let ids: Vec<_> = tasks_for_date(&tasks, date(2, 5))
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["done", "due", "due-done"]);

        let ids: Vec<_> = tasks_for_date(&tasks, date(2, 3))
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["due-done"]);
    }

    #[test]
    fn reopened_task_leaves_completion_day() {
        let now = local(2024, 2, 1, 9);
        let mut task = Task::new("t", "Reopened", now).unwrap();
        task.set_status(TaskStatus::Done, local(2024, 2, 5, 10));
        task.set_status(TaskStatus::Todo, local(2024, 2, 5, 11));
        assert!(tasks_for_date(std::slice::from_ref(&task), date(2, 5)).is_empty());
    }

    #[test]
    fn month_view_covers_whole_month() {
        let days = month_view(&[], 2024, 2, date(2, 14)).unwrap();
        assert_eq!(days.len(), 29);
        assert_eq!(days.iter().filter(|d| d.is_today).count(), 1);
        assert!(month_view(&[], 2024, 13, date(2, 14)).is_none());
    }
}
