use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use apexmind_core::timer::normalize_minutes;
use apexmind_core::{App, TickControl, TickScheduler};
use clap::Subcommand;
use serde_json::json;
use tokio::sync::Mutex;

use super::{open_app, print_json};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the timer, optionally tracking time against a task
    Start {
        /// Task ID to credit tracked time to
        #[arg(long)]
        task: Option<String>,
    },
    /// Stop the timer and credit the remaining time
    Stop,
    /// Reset to a fresh idle session
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Set the countdown length in minutes (leaves infinite mode)
    Duration {
        /// Minutes; values below 1 are raised to 1
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Turn count-up (infinite) mode on or off
    Infinite {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Drive the running timer live until it stops or Ctrl-C
    Watch,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn Error>> {
    let (mut app, config) = open_app()?;

    match action {
        TimerAction::Start { task } => {
            if let Some(id) = task.as_deref() {
                if app.task(id).is_none() {
                    return Err(format!("task not found: {id}").into());
                }
            }
            match app.start_timer(task) {
                Some(event) => print_json(&event)?,
                None => print_json(&app.timer().snapshot(app.now()))?,
            }
        }
        TimerAction::Stop => {
            let events = app.stop_timer();
            if events.is_empty() {
                print_json(&app.timer().snapshot(app.now()))?;
            } else {
                print_json(&events)?;
            }
        }
        TimerAction::Reset => {
            let event = app.reset_timer();
            print_json(&event)?;
        }
        TimerAction::Status => {
            // Catch up flushes and completion before reporting.
            let report = app.tick();
            print_json(&json!({
                "display": report.display,
                "face": report.display.face(),
                "events": report.events,
            }))?;
        }
        TimerAction::Duration { minutes } => {
            let minutes = normalize_minutes(minutes);
            app.set_timer_duration(minutes.saturating_mul(60));
            app.set_infinite_mode(false);
            print_json(&app.timer().snapshot(app.now()))?;
        }
        TimerAction::Infinite { enabled } => {
            app.set_infinite_mode(enabled);
            print_json(&app.timer().snapshot(app.now()))?;
        }
        TimerAction::Watch => {
            let period = Duration::from_millis(config.timer.tick_interval_ms.max(1));
            watch(app, period)?;
        }
    }
    Ok(())
}

/// Tick the app on a fixed period, printing events as JSON lines on stdout
/// and the clock face on stderr. Returns when the timer stops or on Ctrl-C;
/// an interrupted timer keeps running and is picked up by the next command.
fn watch(app: App, period: Duration) -> Result<(), Box<dyn Error>> {
    if !app.timer().is_running() {
        return Err("timer is not running; start it with `apexmind timer start`".into());
    }
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let app = Arc::new(Mutex::new(app));
        let loop_app = app.clone();
        let mut handle = TickScheduler::new(period).spawn(move || {
            let app = loop_app.clone();
            async move {
                let report = app.lock().await.tick();
                for event in &report.events {
                    match serde_json::to_string(event) {
                        Ok(line) => println!("{line}"),
                        Err(e) => tracing::warn!(error = %e, "failed to encode event"),
                    }
                }
                eprint!("\r{}  ", report.display.face());
                if report.running() {
                    TickControl::Continue
                } else {
                    TickControl::Stop
                }
            }
        });

        let interrupted = tokio::select! {
            _ = handle.finished() => false,
            signal = tokio::signal::ctrl_c() => {
                signal?;
                true
            }
        };
        if interrupted {
            handle.cancel().await;
        }
        eprintln!();
        Ok::<(), Box<dyn Error>>(())
    })
}
