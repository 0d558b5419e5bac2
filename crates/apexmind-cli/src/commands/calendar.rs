use apexmind_core::calendar::{month_view, tasks_for_date};
use chrono::Datelike;
use clap::Subcommand;
use serde_json::json;

use super::{open_app, parse_date, print_json};

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Tasks completed or due on a day
    Day {
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Every day of a month with its tasks
    Month {
        /// Year (default: current)
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12 (default: current)
        #[arg(long)]
        month: Option<u32>,
    },
}

pub fn run(action: CalendarAction) -> Result<(), Box<dyn std::error::Error>> {
    let (app, _config) = open_app()?;
    let today = app.today();

    match action {
        CalendarAction::Day { date } => {
            let date = match date.as_deref() {
                Some(d) => parse_date(d)?,
                None => today,
            };
            print_json(&json!({
                "date": date,
                "is_today": date == today,
                "tasks": tasks_for_date(app.tasks(), date),
            }))?;
        }
        CalendarAction::Month { year, month } => {
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let days = month_view(app.tasks(), year, month, today)
                .ok_or_else(|| format!("invalid month: {year}-{month}"))?;
            print_json(&days)?;
        }
    }
    Ok(())
}
