//! Simulated progress for jobs whose remote computation reports none
//!
//! The backend gives no intermediate progress for an upload, so while the
//! request is outstanding a [`ProgressSimulator`] produces a plausible,
//! strictly bounded value: every tick adds a random increment and the value is
//! clamped to a cap below 100. The real completion sets 100.

use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::app::timer::{spawn_repeating, FirstTick, TimerHandle};
use crate::constants::progress;

/// Configuration of the progress simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Time between ticks
    pub tick_interval: Duration,
    /// Upper bound (exclusive) of one increment
    pub max_increment: f64,
    /// Value the simulation never exceeds
    pub cap: f64,
    /// Seed for reproducible increments
    pub seed: Option<u64>,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            tick_interval: progress::TICK_INTERVAL,
            max_increment: progress::MAX_INCREMENT,
            cap: progress::CAP,
            seed: None,
        }
    }
}

impl ProgressConfig {
    /// Use a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval.is_zero() {
            return Err("Progress tick interval cannot be zero".to_string());
        }
        if !(self.max_increment.is_finite() && self.max_increment >= 0.0) {
            return Err("Progress increment must be a non-negative number".to_string());
        }
        if !(self.cap > 0.0 && self.cap <= progress::COMPLETE) {
            return Err(format!(
                "Progress cap must be within (0, {}]",
                progress::COMPLETE
            ));
        }
        Ok(())
    }
}

/// Next simulated value: `current + increment`, never above `cap` and never
/// below `current`
pub fn advance(current: f64, increment: f64, cap: f64) -> f64 {
    (current + increment.max(0.0)).min(cap).max(current)
}

/// Running progress simulation; the value itself is the handle
#[derive(Debug)]
pub struct ProgressSimulator {
    timer: TimerHandle,
    // Held while a tick is delivered and while stopping, so no tick can start
    // after `stop` returns
    stopped: Arc<Mutex<bool>>,
}

impl ProgressSimulator {
    /// Start ticking; `on_tick` receives each new value
    ///
    /// The first tick fires one interval after start. The timer ends by itself
    /// once the cap is reached.
    pub fn start<F>(config: &ProgressConfig, mut on_tick: F) -> Self
    where
        F: FnMut(f64) + Send + 'static,
    {
        let stopped = Arc::new(Mutex::new(false));
        let gate = Arc::clone(&stopped);
        let max_increment = config.max_increment;
        let cap = config.cap;
        let mut rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut current = 0.0_f64;

        let timer = spawn_repeating(
            "progress",
            config.tick_interval,
            FirstTick::AfterPeriod,
            move || {
                let guard = gate.lock().unwrap_or_else(PoisonError::into_inner);
                let flow = if *guard {
                    ControlFlow::Break(())
                } else {
                    current = advance(current, rng.f64() * max_increment, cap);
                    trace!("Simulated progress {:.1}", current);
                    on_tick(current);
                    if current >= cap {
                        ControlFlow::Break(())
                    } else {
                        ControlFlow::Continue(())
                    }
                };
                drop(guard);
                std::future::ready(flow)
            },
        );

        Self { timer, stopped }
    }

    /// Stop ticking; idempotent and safe after natural completion
    pub fn stop(&mut self) {
        let mut stopped = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        self.timer.stop();
    }

    /// Whether ticks may still be delivered
    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        self.stop();
    }
}
