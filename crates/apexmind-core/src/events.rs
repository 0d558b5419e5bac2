use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskStatus;
use crate::timer::TimerState;

/// Every state change in the system produces an Event.
/// Front ends print or forward them; the core never acts on them again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        task_id: Option<String>,
        /// `None` in infinite mode.
        duration_secs: Option<u64>,
        at: DateTime<Utc>,
    },
    TimerStopped {
        task_id: Option<String>,
        /// Length of the interval that just ended.
        interval_secs: u64,
        /// Session total after the interval was added.
        time_elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero and the timer stopped itself.
    TimerCompleted {
        task_id: Option<String>,
        interval_secs: u64,
        time_elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// Tracked seconds credited to a task's ledger.
    TimeFlushed {
        task_id: String,
        seconds: u64,
        day: NaiveDate,
        at: DateTime<Utc>,
    },
    DayRolledOver {
        from: NaiveDate,
        to: NaiveDate,
    },
    TaskStatusChanged {
        task_id: String,
        from: TaskStatus,
        to: TaskStatus,
        at: DateTime<Utc>,
    },
    /// Completed tasks removed by the expiry sweep.
    TasksExpired {
        task_ids: Vec<String>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        task_id: Option<String>,
        elapsed_secs: u64,
        remaining_secs: Option<u64>,
        time_elapsed_secs: u64,
        is_infinite: bool,
        at: DateTime<Utc>,
    },
}
