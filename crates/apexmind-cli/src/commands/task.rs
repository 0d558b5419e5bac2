//! Task management commands for CLI.

use std::collections::BTreeSet;

use apexmind_core::{NewTask, Priority, Task, TaskPatch, TaskStatus};
use chrono::NaiveDate;
use clap::Subcommand;
use serde::Serialize;

use super::{new_id, open_app, parse_date, print_json};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create {
        /// Task title
        title: String,
        /// Task description
        #[arg(long)]
        description: Option<String>,
        /// low, medium or high (default: medium)
        #[arg(long)]
        priority: Option<String>,
        /// Comma-separated labels
        #[arg(long)]
        labels: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// List tasks
    List {
        /// Filter by status (todo, in-progress, done)
        #[arg(long)]
        status: Option<String>,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Update a task
    Update {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description (empty string clears it)
        #[arg(long)]
        description: Option<String>,
        /// New priority
        #[arg(long)]
        priority: Option<String>,
        /// Comma-separated labels, replacing the current ones
        #[arg(long)]
        labels: Option<String>,
        /// New due date (YYYY-MM-DD, or "none" to clear)
        #[arg(long)]
        due: Option<String>,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Change a task's status
    Status {
        /// Task ID
        id: String,
        /// todo, in-progress or done
        status: String,
    },
    /// Add a subtask
    Subtask {
        /// Task ID
        id: String,
        /// Subtask title
        title: String,
    },
    /// Toggle a subtask's completion
    ToggleSubtask {
        /// Task ID
        id: String,
        /// Subtask ID
        subtask_id: String,
    },
    /// Manually add tracked minutes to today
    AddTime {
        /// Task ID
        id: String,
        /// Minutes to add
        minutes: u64,
    },
}

/// A task as printed, with today's tracked time alongside the ledger.
#[derive(Serialize)]
struct TaskRow<'a> {
    #[serde(flatten)]
    task: &'a Task,
    time_tracked_today: u64,
}

fn row(task: &Task, today: NaiveDate) -> TaskRow<'_> {
    TaskRow {
        task,
        time_tracked_today: task.time_tracked(today),
    }
}

fn parse_labels(labels: &str) -> BTreeSet<String> {
    labels
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn not_found(id: &str) -> Box<dyn std::error::Error> {
    format!("task not found: {id}").into()
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut app, _config) = open_app()?;
    let today = app.today();

    match action {
        TaskAction::Create {
            title,
            description,
            priority,
            labels,
            due,
        } => {
            let new = NewTask {
                title,
                description,
                priority: priority
                    .as_deref()
                    .map(str::parse::<Priority>)
                    .transpose()?
                    .unwrap_or_default(),
                labels: labels.as_deref().map(parse_labels).unwrap_or_default(),
                due_date: due.as_deref().map(parse_date).transpose()?,
            };
            let task = app.add_task(new_id(), new)?;
            eprintln!("Task created: {}", task.id);
            print_json(&row(task, today))?;
        }
        TaskAction::List { status } => {
            let status = status.as_deref().map(str::parse::<TaskStatus>).transpose()?;
            let rows: Vec<_> = app
                .tasks()
                .iter()
                .filter(|t| status.map_or(true, |s| t.status() == s))
                .map(|t| row(t, today))
                .collect();
            print_json(&rows)?;
        }
        TaskAction::Get { id } => {
            let task = app.task(&id).ok_or_else(|| not_found(&id))?;
            print_json(&row(task, today))?;
        }
        TaskAction::Update {
            id,
            title,
            description,
            priority,
            labels,
            due,
        } => {
            let due_date = match due.as_deref() {
                None => None,
                Some("none") => Some(None),
                Some(d) => Some(Some(parse_date(d)?)),
            };
            let patch = TaskPatch {
                title,
                description: description.map(|d| (!d.is_empty()).then_some(d)),
                priority: priority.as_deref().map(str::parse::<Priority>).transpose()?,
                labels: labels.as_deref().map(parse_labels),
                due_date,
            };
            if !app.update_task(&id, patch)? {
                return Err(not_found(&id));
            }
            let task = app.task(&id).ok_or_else(|| not_found(&id))?;
            print_json(&row(task, today))?;
        }
        TaskAction::Delete { id } => {
            app.delete_task(&id).ok_or_else(|| not_found(&id))?;
            println!("Task deleted: {id}");
        }
        TaskAction::Status { id, status } => {
            let status: TaskStatus = status.parse()?;
            let event = app.set_task_status(&id, status).ok_or_else(|| not_found(&id))?;
            print_json(&event)?;
        }
        TaskAction::Subtask { id, title } => {
            if !app.add_subtask(&id, new_id(), title)? {
                return Err(not_found(&id));
            }
            let task = app.task(&id).ok_or_else(|| not_found(&id))?;
            print_json(&task.subtasks)?;
        }
        TaskAction::ToggleSubtask { id, subtask_id } => {
            if !app.toggle_subtask(&id, &subtask_id) {
                return Err(format!("subtask not found: {id}/{subtask_id}").into());
            }
            let task = app.task(&id).ok_or_else(|| not_found(&id))?;
            print_json(&task.subtasks)?;
        }
        TaskAction::AddTime { id, minutes } => {
            let total = app
                .add_time(&id, minutes.saturating_mul(60))
                .ok_or_else(|| not_found(&id))?;
            print_json(&serde_json::json!({
                "task_id": id,
                "day": today,
                "time_tracked_today": total,
            }))?;
        }
    }
    Ok(())
}
