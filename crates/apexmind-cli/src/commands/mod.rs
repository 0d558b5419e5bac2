pub mod calendar;
pub mod config;
pub mod notes;
pub mod stats;
pub mod task;
pub mod theme;
pub mod timer;

use std::error::Error;
use std::sync::Arc;

use apexmind_core::{App, Config, SystemClock};
use chrono::NaiveDate;
use serde::Serialize;

/// Open the app against the on-disk database with settings from config.
pub fn open_app() -> Result<(App, Config), Box<dyn Error>> {
    Ok(App::open(Arc::new(SystemClock))?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}").into())
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
