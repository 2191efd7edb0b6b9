//! Cancellable repeating timers
//!
//! Every periodic activity in the client (simulated progress, health polling)
//! runs on a [`TimerHandle`]. The handle owns the background task: `stop` is
//! idempotent and dropping the handle stops the timer, so a timer can never
//! outlive its owner.

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// When the first tick fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTick {
    /// Right away, then every period
    Immediate,
    /// One period after start
    AfterPeriod,
}

/// Handle to a running repeating timer
#[derive(Debug)]
pub struct TimerHandle {
    label: &'static str,
    shutdown_tx: broadcast::Sender<()>,
    stopped: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

/// Start a repeating timer on the current tokio runtime
///
/// `on_tick` is awaited inline, so ticks of one timer never overlap. Returning
/// `ControlFlow::Break` ends the timer naturally.
pub fn spawn_repeating<F, Fut>(
    label: &'static str,
    period: Duration,
    first_tick: FirstTick,
    mut on_tick: F,
) -> TimerHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ControlFlow<()>> + Send + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
    let stopped = Arc::new(AtomicBool::new(false));
    let task_stopped = Arc::clone(&stopped);
    // A zero period would make tokio's interval panic
    let period = period.max(Duration::from_millis(1));

    let task = tokio::spawn(async move {
        let start = match first_tick {
            FirstTick::Immediate => Instant::now(),
            FirstTick::AfterPeriod => Instant::now() + period,
        };
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    debug!("{} timer received shutdown signal", label);
                    break;
                }
                _ = interval.tick() => {
                    if task_stopped.load(Ordering::Acquire) {
                        break;
                    }
                    if on_tick().await.is_break() {
                        debug!("{} timer finished", label);
                        break;
                    }
                }
            }
        }

        task_stopped.store(true, Ordering::Release);
    });

    debug!("{} timer started (period {} ms)", label, period.as_millis());

    TimerHandle {
        label,
        shutdown_tx,
        stopped,
        task: Some(task),
    }
}

impl TimerHandle {
    /// Stop the timer; safe to call repeatedly or after it finished on its own
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            self.stopped.store(true, Ordering::Release);
            let _ = self.shutdown_tx.send(());
            task.abort();
            debug!("{} timer stopped", self.label);
        }
    }

    /// Whether ticks may still be delivered
    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::Acquire)
            && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Timer name used in logs
    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
