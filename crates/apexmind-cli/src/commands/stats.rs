use apexmind_core::stats::{
    completion_heatmap, daily_totals, format_tracked, summarize, top_tracked,
};
use chrono::{Days, NaiveDate};
use clap::Subcommand;
use serde_json::json;

use super::{open_app, print_json};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Task counts by status
    Summary,
    /// Tasks with the most time tracked today
    Top {
        /// Maximum number of tasks
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Completed tasks per day over the last N days
    Heatmap {
        #[arg(long, default_value = "30")]
        days: u64,
    },
    /// Tracked time per day over the last N days
    Totals {
        #[arg(long, default_value = "7")]
        days: u64,
    },
}

/// First day of a window of `days` days ending `today`.
fn window_start(today: NaiveDate, days: u64) -> NaiveDate {
    today
        .checked_sub_days(Days::new(days.saturating_sub(1)))
        .unwrap_or(NaiveDate::MIN)
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (app, _config) = open_app()?;
    let today = app.today();

    match action {
        StatsAction::Summary => {
            print_json(&summarize(app.tasks()))?;
        }
        StatsAction::Top { limit } => {
            print_json(&top_tracked(app.tasks(), today, limit))?;
        }
        StatsAction::Heatmap { days } => {
            let from = window_start(today, days);
            print_json(&completion_heatmap(app.tasks(), from, today))?;
        }
        StatsAction::Totals { days } => {
            let from = window_start(today, days);
            let rows: Vec<_> = daily_totals(app.tasks(), from, today)
                .into_iter()
                .map(|t| {
                    json!({
                        "date": t.date,
                        "seconds": t.seconds,
                        "formatted": format_tracked(t.seconds),
                    })
                })
                .collect();
            print_json(&rows)?;
        }
    }
    Ok(())
}
