//! Periodic tick scheduling.
//!
//! Kept apart from the reconciliation logic: the scheduler only decides
//! *when* to call back, the callback decides what a tick does.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Returned by a tick callback to keep or end the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Stop,
}

/// Spawns cancellable fixed-interval tick loops on the current tokio runtime.
#[derive(Debug, Clone, Copy)]
pub struct TickScheduler {
    period: Duration,
}

/// Handle to a running tick loop. Dropping it cancels future ticks.
#[derive(Debug)]
pub struct TickHandle {
    cancel: Option<oneshot::Sender<()>>,
    /// `None` once the loop has been awaited to completion.
    join: Option<JoinHandle<()>>,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Call `on_tick` once per period, starting one period from now.
    ///
    /// Each callback runs to completion before the next tick is awaited, so
    /// ticks never overlap. Late ticks are delayed rather than bunched.
    pub fn spawn<F, Fut>(&self, mut on_tick: F) -> TickHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = TickControl> + Send + 'static,
    {
        let (cancel, mut cancelled) = oneshot::channel::<()>();
        let period = self.period;
        let join = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = &mut cancelled => break,
                    _ = interval.tick() => {
                        if on_tick().await == TickControl::Stop {
                            break;
                        }
                    }
                }
            }
        });
        TickHandle {
            cancel: Some(cancel),
            join: Some(join),
        }
    }
}

impl TickHandle {
    /// Stop future ticks and wait for the loop to exit.
    ///
    /// Returns at once if [`finished`](Self::finished) already saw the loop end.
    pub async fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.await;
        }
    }

    /// Wait until the callback returns [`TickControl::Stop`].
    ///
    /// Borrows the handle so it can still be cancelled if this is raced
    /// against something else and loses. Calling it again after the loop
    /// has ended returns immediately.
    pub async fn finished(&mut self) {
        if let Some(join) = self.join.as_mut() {
            let _ = join.await;
            self.join = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn callback_stop_ends_loop() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let mut handle = TickScheduler::new(Duration::from_secs(1)).spawn(move || {
            let seen = seen.clone();
            async move {
                let n = seen.fetch_add(1, Ordering::SeqCst) + 1;
                if n == 3 {
                    TickControl::Stop
                } else {
                    TickControl::Continue
                }
            }
        });
        handle.finished().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_finished_returns() {
        let mut handle =
            TickScheduler::new(Duration::from_secs(1)).spawn(|| async { TickControl::Stop });
        handle.finished().await;
        handle.finished().await;
        handle.cancel().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_future_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let handle = TickScheduler::new(Duration::from_secs(1)).spawn(move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                TickControl::Continue
            }
        });
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        handle.cancel().await;
        let at_cancel = count.load(Ordering::SeqCst);
        assert_eq!(at_cancel, 3);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), at_cancel);
    }
}
