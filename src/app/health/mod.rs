//! Backend health monitoring
//!
//! A [`HealthMonitor`] keeps a [`HealthState`] describing the backend's own
//! report of its health. Checks run on demand through
//! [`HealthMonitor::check_health`] and on a fixed schedule between
//! [`HealthMonitor::start`] and [`HealthMonitor::stop`].
//!
//! Connectivity problems are the normal case for this monitor, so a failed
//! check is never an error: it publishes `Offline` with no component detail.
//! At most one check is in flight at a time; a check requested while another
//! is running is skipped rather than queued.

pub mod config;
pub mod types;

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::app::client::{ApiRequest, Transport};
use crate::app::timer::{spawn_repeating, FirstTick, TimerHandle};
use crate::constants::endpoints;

pub use config::HealthConfig;
pub use types::{CheckOutcome, HealthState, HealthStatus};

/// Polls the backend's status endpoint and publishes the result
pub struct HealthMonitor<T>
where
    T: Transport,
{
    inner: Arc<MonitorInner<T>>,
    poller: Mutex<Option<TimerHandle>>,
}

struct MonitorInner<T> {
    transport: Arc<T>,
    config: HealthConfig,
    state: watch::Sender<HealthState>,
    in_flight: AtomicBool,
}

impl<T> HealthMonitor<T>
where
    T: Transport + 'static,
{
    /// Create a monitor in the `Checking` state; nothing runs until asked
    pub fn new(transport: Arc<T>, config: HealthConfig) -> Self {
        let (state, _) = watch::channel(HealthState::default());

        Self {
            inner: Arc::new(MonitorInner {
                transport,
                config,
                state,
                in_flight: AtomicBool::new(false),
            }),
            poller: Mutex::new(None),
        }
    }

    /// Receiver notified whenever the published state changes
    pub fn subscribe(&self) -> watch::Receiver<HealthState> {
        self.inner.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> HealthState {
        self.inner.state.borrow().clone()
    }

    /// Run one check now, unless one is already in flight
    pub async fn check_health(&self) -> CheckOutcome {
        self.inner.check().await
    }

    /// Check immediately, then every poll interval until stopped
    ///
    /// No-op while already polling. Must be called from within a tokio
    /// runtime.
    pub fn start(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if poller.as_ref().is_some_and(TimerHandle::is_running) {
            debug!("Health monitor already running");
            return;
        }

        // The poller must not keep the monitor alive
        let weak: Weak<MonitorInner<T>> = Arc::downgrade(&self.inner);
        let handle = spawn_repeating(
            "health",
            self.inner.config.poll_interval,
            FirstTick::Immediate,
            move || {
                let weak = weak.clone();
                async move {
                    match weak.upgrade() {
                        Some(inner) => {
                            inner.check().await;
                            ControlFlow::Continue(())
                        }
                        None => ControlFlow::Break(()),
                    }
                }
            },
        );

        info!(
            "Health monitor started (every {} s)",
            self.inner.config.poll_interval.as_secs()
        );
        *poller = Some(handle);
    }

    /// Stop scheduled checks; idempotent
    pub fn stop(&self) {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut handle) = poller.take() {
            handle.stop();
            info!("Health monitor stopped");
        }
    }

    /// Whether scheduled checks are active
    pub fn is_running(&self) -> bool {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(TimerHandle::is_running)
    }
}

impl<T> Drop for HealthMonitor<T>
where
    T: Transport,
{
    fn drop(&mut self) {
        let poller = self.poller.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut handle) = poller.take() {
            handle.stop();
        }
    }
}

impl<T> MonitorInner<T>
where
    T: Transport,
{
    async fn check(&self) -> CheckOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!("Health check already in flight, skipping");
            return CheckOutcome::Skipped;
        };

        let request = ApiRequest::get(endpoints::HEALTH).with_timeout(self.config.timeout);
        let outcome = self.transport.call(request).await;
        let now = Utc::now();

        let next = match outcome {
            Ok(body) => state_from_body(&body, now).unwrap_or_else(|| {
                warn!("Health response has no status: {}", body);
                HealthState::offline(now)
            }),
            Err(error) => {
                warn!("Health check failed: {}", error);
                HealthState::offline(now)
            }
        };

        let status = next.status;
        self.state.send_if_modified(|current| {
            if current.status != status {
                debug!("Backend health {} -> {}", current.status, status);
            }
            let changed = *current != next;
            *current = next;
            changed
        });

        CheckOutcome::Completed(status)
    }
}

/// Build the published state from a `{status, components}` body
///
/// Returns `None` when the body carries no string `status`. Component values
/// that are not strings are kept as their JSON text.
pub fn state_from_body(body: &Value, checked_at: DateTime<Utc>) -> Option<HealthState> {
    let object = body.as_object()?;
    let status = object.get("status")?.as_str()?;

    let components: BTreeMap<String, String> = object
        .get("components")
        .and_then(Value::as_object)
        .map(|components| {
            components
                .iter()
                .map(|(name, value)| {
                    let text = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (name.clone(), text)
                })
                .collect()
        })
        .unwrap_or_default();

    Some(HealthState {
        status: HealthStatus::from_reported(status),
        components,
        last_checked: Some(checked_at),
    })
}

/// Marks a check as in flight; cleared on drop, including cancellation
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
