//! Analytics over tasks.
//!
//! Everything here is a read-only view: status counts, the most-tracked
//! tasks of the day, a completion heatmap and per-day tracked totals built
//! from the task ledgers.

mod activity;
mod summary;

pub use activity::{completion_heatmap, daily_totals, DayCount, DayTotal};
pub use summary::{format_tracked, summarize, top_tracked, TaskSummary, TrackedEntry};
