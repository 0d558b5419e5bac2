//! Integration tests for driving the application context from the tick
//! scheduler, the way `apexmind timer watch` does.

use std::sync::Arc;
use std::time::Duration;

use apexmind_core::{
    App, AppSettings, Event, ManualClock, MemoryStore, NewTask, TickControl, TickScheduler,
};
use chrono::{Local, NaiveDate, TimeZone, Utc};
use tokio::sync::Mutex;

fn boot() -> (Arc<Mutex<App>>, ManualClock) {
    let start = Local
        .with_ymd_and_hms(2024, 6, 3, 10, 0, 0)
        .unwrap()
        .with_timezone(&Utc);
    let clock = ManualClock::new(start);
    let app = App::load(
        Box::new(MemoryStore::new()),
        Arc::new(clock.clone()),
        AppSettings::default(),
    );
    (Arc::new(Mutex::new(app)), clock)
}

#[tokio::test(start_paused = true)]
async fn test_watch_loop_runs_countdown_to_completion() {
    let (app, clock) = boot();
    {
        let mut app = app.lock().await;
        app.add_task("a", NewTask::titled("Sprint")).unwrap();
        app.set_timer_duration(120);
        app.start_timer(Some("a".into()));
    }

    let events = Arc::new(Mutex::new(Vec::<Event>::new()));
    let (loop_app, loop_clock, loop_events) = (app.clone(), clock.clone(), events.clone());
    let mut handle = TickScheduler::new(Duration::from_secs(1)).spawn(move || {
        let (app, clock, events) = (loop_app.clone(), loop_clock.clone(), loop_events.clone());
        async move {
            clock.advance(chrono::Duration::seconds(1));
            let report = app.lock().await.tick();
            let running = report.running();
            events.lock().await.extend(report.events);
            if running {
                TickControl::Continue
            } else {
                TickControl::Stop
            }
        }
    });
    handle.finished().await;

    let events = events.lock().await;
    assert!(matches!(
        events.last(),
        Some(Event::TimerCompleted {
            interval_secs: 120,
            ..
        })
    ));
    let app = app.lock().await;
    let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
    assert_eq!(app.task("a").unwrap().time_tracked(day), 120);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_watch_leaves_timer_running() {
    let (app, clock) = boot();
    app.lock().await.start_timer(None);

    let (loop_app, loop_clock) = (app.clone(), clock.clone());
    let handle = TickScheduler::new(Duration::from_secs(1)).spawn(move || {
        let (app, clock) = (loop_app.clone(), loop_clock.clone());
        async move {
            clock.advance(chrono::Duration::seconds(1));
            app.lock().await.tick();
            TickControl::Continue
        }
    });
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    handle.cancel().await;

    let app = app.lock().await;
    assert!(app.timer().is_running());
    assert_eq!(app.timer_display().elapsed_secs, 10);
}
