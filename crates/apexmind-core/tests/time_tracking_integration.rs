//! Integration tests for the timer -> ledger -> projection flow.
//!
//! These drive the application context with a hand-driven clock across
//! flushes, day boundaries and the completed-task sweep, then check what
//! the calendar and analytics projections see.

use std::sync::Arc;

use apexmind_core::calendar::{month_view, tasks_for_date};
use apexmind_core::stats::{daily_totals, summarize, top_tracked};
use apexmind_core::{
    App, AppSettings, Event, ExpiryPolicy, ManualClock, MemoryStore, NewTask, TaskStatus,
};
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

fn local(d: u32, h: u32, m: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(2024, 3, d, h, m, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn march(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn boot(start: DateTime<Utc>, settings: AppSettings) -> (App, ManualClock) {
    let clock = ManualClock::new(start);
    let app = App::load(Box::new(MemoryStore::new()), Arc::new(clock.clone()), settings);
    (app, clock)
}

fn run_for(app: &mut App, clock: &ManualClock, secs: u32) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..secs {
        clock.advance(Duration::seconds(1));
        events.extend(app.tick().events);
    }
    events
}

#[test]
fn test_focus_session_lands_in_todays_ledger() {
    let (mut app, clock) = boot(local(4, 9, 0), AppSettings::default());
    app.add_task("essay", NewTask::titled("Essay draft")).unwrap();
    app.add_task("mail", NewTask::titled("Inbox zero")).unwrap();

    app.start_timer(Some("essay".into()));
    let events = run_for(&mut app, &clock, 5 * 60);
    let flushed: u64 = events
        .iter()
        .filter_map(|e| match e {
            Event::TimeFlushed { seconds, .. } => Some(*seconds),
            _ => None,
        })
        .sum();
    assert_eq!(flushed, 300);
    app.stop_timer();

    app.start_timer(Some("mail".into()));
    run_for(&mut app, &clock, 90);
    app.stop_timer();

    let top = top_tracked(app.tasks(), app.today(), 5);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].task_id, "essay");
    assert_eq!(top[0].minutes, 5);
    assert_eq!(top[1].minutes, 2);
    assert_eq!(app.timer().time_elapsed_secs(), 390);
}

#[test]
fn test_session_spanning_midnight_splits_by_flush_day() {
    let (mut app, clock) = boot(local(4, 23, 58), AppSettings::default());
    app.add_task("late", NewTask::titled("Late night")).unwrap();
    app.start_timer(Some("late".into()));

    // 23:58 -> 00:03, flushing every minute. The flush at 00:00:00 is
    // already on the new day.
    let events = run_for(&mut app, &clock, 5 * 60);
    assert!(events.contains(&Event::DayRolledOver {
        from: march(4),
        to: march(5)
    }));
    app.stop_timer();

    let task = app.task("late").unwrap();
    assert_eq!(task.ledger().seconds_on(march(4)), 60);
    assert_eq!(task.ledger().seconds_on(march(5)), 240);
    assert_eq!(task.time_tracked(march(5)), 240);

    let totals = daily_totals(app.tasks(), march(4), march(5));
    assert_eq!(totals[0].seconds, 60);
    assert_eq!(totals[1].seconds, 240);
}

#[test]
fn test_completed_task_visible_today_then_swept() {
    let (mut app, clock) = boot(local(10, 14, 0), AppSettings::default());
    app.add_task("ship", NewTask::titled("Ship release")).unwrap();
    app.add_time("ship", 1_800);
    app.set_task_status("ship", TaskStatus::Done);

    let today = tasks_for_date(app.tasks(), march(10));
    assert_eq!(today.len(), 1);
    assert_eq!(summarize(app.tasks()).done, 1);

    clock.set(local(11, 0, 1));
    let events = app.observe_day();
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::TasksExpired { task_ids, .. } if task_ids.len() == 1)));
    assert!(app.tasks().is_empty());
}

#[test]
fn test_retained_tasks_show_on_completion_day_in_month_view() {
    let settings = AppSettings {
        expiry_policy: ExpiryPolicy::Retain,
        ..AppSettings::default()
    };
    let (mut app, clock) = boot(local(10, 14, 0), settings);
    app.add_task("ship", NewTask::titled("Ship release")).unwrap();
    app.set_task_status("ship", TaskStatus::Done);

    clock.set(local(20, 9, 0));
    app.observe_day();

    let month = month_view(app.tasks(), 2024, 3, app.today()).unwrap();
    assert_eq!(month.len(), 31);
    let tenth = &month[9];
    assert_eq!(tenth.date, march(10));
    assert_eq!(tenth.tasks.len(), 1);
    assert!(month[19].is_today);
    assert!(month[19].tasks.is_empty());
}

#[test]
fn test_reopened_task_is_not_swept() {
    let (mut app, clock) = boot(local(10, 14, 0), AppSettings::default());
    app.add_task("t", NewTask::titled("Flip-flop")).unwrap();
    app.set_task_status("t", TaskStatus::Done);
    app.set_task_status("t", TaskStatus::InProgress);

    clock.set(local(12, 9, 0));
    app.observe_day();
    let task = app.task("t").unwrap();
    assert_eq!(task.status(), TaskStatus::InProgress);
    assert!(task.completed_at().is_none());
}

#[test]
fn test_infinite_mode_never_completes() {
    let (mut app, clock) = boot(local(4, 9, 0), AppSettings::default());
    app.add_task("deep", NewTask::titled("Deep work")).unwrap();
    app.set_timer_duration(60);
    app.set_infinite_mode(true);
    app.start_timer(Some("deep".into()));

    let events = run_for(&mut app, &clock, 180);
    assert!(!events
        .iter()
        .any(|e| matches!(e, Event::TimerCompleted { .. })));
    assert!(app.timer().is_running());
    assert_eq!(app.timer_display().remaining_secs, None);

    app.set_infinite_mode(false);
    assert_eq!(app.timer().duration_secs(), 60);
}
