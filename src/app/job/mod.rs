//! Job orchestration
//!
//! A [`JobOrchestrator`] owns exactly one job's state and drives it through
//! `Idle -> Uploading -> Settling -> Completed | Failed`. Every change goes
//! through the pure [`JobState::apply`] transition function; the async driver
//! only feeds it events.
//!
//! # Architecture
//!
//! - [`state`] - phases, events and the transition function
//! - [`config`] - request timeout, settle delay and progress simulation
//!
//! `submit` validates synchronously and then spawns one job task. That task
//! starts a [`ProgressSimulator`], issues the upload through the [`Transport`],
//! stops the simulator once the call returns, settles, normalizes the payload
//! and publishes the terminal state. Observers read state through a
//! `tokio::sync::watch` receiver and never write it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use junction_client::app::{ApiClient, ClientConfig, JobConfig, JobOrchestrator, VideoFile};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ApiClient::new(&ClientConfig::from_env())?);
//! let orchestrator = JobOrchestrator::new(client, JobConfig::default());
//!
//! let mut files = Vec::new();
//! for lane in ["north.mp4", "south.mp4", "west.mp4", "east.mp4"] {
//!     files.push(VideoFile::from_path(lane.as_ref()).await?);
//! }
//! orchestrator.select_files(files);
//! orchestrator.submit()?;
//!
//! let finished = orchestrator.wait_for_terminal().await;
//! println!("{:?}", finished.result);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod state;

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::client::{ApiRequest, Transport};
use crate::app::models::VideoFile;
use crate::app::normalize::normalize;
use crate::app::progress::ProgressSimulator;
use crate::errors::{JobError, JobResult};

pub use config::JobConfig;
pub use state::{JobEvent, JobPhase, JobState, Transition};

/// Top-level state machine for one submission at a time
pub struct JobOrchestrator<T>
where
    T: Transport,
{
    transport: Arc<T>,
    config: JobConfig,
    state: Arc<watch::Sender<JobState>>,
    job_task: Mutex<Option<JoinHandle<()>>>,
}

impl<T> JobOrchestrator<T>
where
    T: Transport + 'static,
{
    /// Create an idle orchestrator
    pub fn new(transport: Arc<T>, config: JobConfig) -> Self {
        let (state, _) = watch::channel(JobState::default());

        Self {
            transport,
            config,
            state: Arc::new(state),
            job_task: Mutex::new(None),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> JobState {
        self.state.borrow().clone()
    }

    /// Replace the selection; ignored unless idle
    pub fn select_files(&self, files: Vec<VideoFile>) -> Transition {
        apply_event(&self.state, JobEvent::SelectFiles(files)).unwrap_or(Transition::Ignored)
    }

    /// Start a job with the current selection
    ///
    /// Returns `Transition::Ignored` without side effects while a job is
    /// uploading or settling. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns a validation error, without touching the network, when the
    /// selection is not exactly four files or a finished job has not been
    /// reset.
    pub fn submit(&self) -> JobResult<Transition> {
        let transition = apply_event(&self.state, JobEvent::Submit)?;
        if !transition.is_applied() {
            debug!("Submit ignored: a job is already running");
            return Ok(transition);
        }

        let (job_id, files) = {
            let current = self.state.borrow();
            (current.job_id, current.selection.clone())
        };
        info!("Starting job {} with {} videos", job_id, files.len());

        let task = tokio::spawn(run_job(
            Arc::clone(&self.transport),
            Arc::clone(&self.state),
            self.config.clone(),
            files,
        ));

        let mut slot = self.job_task.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(task);

        Ok(Transition::Applied)
    }

    /// Return a finished job to idle, keeping the selection
    pub fn reset(&self) -> Transition {
        apply_event(&self.state, JobEvent::Reset).unwrap_or(Transition::Ignored)
    }

    /// Wait until the current job is completed or failed
    ///
    /// Resolves immediately when the state is already terminal.
    pub async fn wait_for_terminal(&self) -> JobState {
        let mut receiver = self.subscribe();
        let outcome = receiver
            .wait_for(|state| state.phase.is_terminal())
            .await
            .map(|state| state.clone());

        match outcome {
            Ok(state) => state,
            Err(_) => self.snapshot(),
        }
    }
}

impl<T> JobOrchestrator<T>
where
    T: Transport,
{
    /// Tear down: cancel the in-flight job together with its progress timer
    ///
    /// A job still uploading or settling is published as `Idle` with its
    /// selection kept, so it can be submitted again. A finished job keeps its
    /// terminal state.
    pub fn shutdown(&self) {
        let mut slot = self.job_task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.take() {
            task.abort();
            if apply_event(&self.state, JobEvent::Cancelled).is_ok_and(|t| t.is_applied()) {
                info!("Cancelled in-flight job {}", self.state.borrow().job_id);
            }
        }
    }
}

impl<T> Drop for JobOrchestrator<T>
where
    T: Transport,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Apply an event and notify observers only when it changed something
fn apply_event(state: &watch::Sender<JobState>, event: JobEvent) -> JobResult<Transition> {
    let mut outcome = Ok(Transition::Ignored);
    state.send_if_modified(|current| {
        outcome = current.apply(event);
        matches!(outcome, Ok(Transition::Applied))
    });
    outcome
}

/// Drive one accepted submission to a terminal phase
async fn run_job<T>(
    transport: Arc<T>,
    state: Arc<watch::Sender<JobState>>,
    config: JobConfig,
    files: Vec<VideoFile>,
) where
    T: Transport,
{
    let tick_state = Arc::clone(&state);
    let mut simulator = ProgressSimulator::start(&config.progress, move |value| {
        let _ = apply_event(&tick_state, JobEvent::Progress(value));
    });

    let request = ApiRequest::upload(&files).with_timeout(config.request_timeout);
    let outcome = transport.call(request).await;
    simulator.stop();

    match outcome {
        Ok(payload) => settle(&state, &config, payload).await,
        Err(error) => {
            warn!("Job failed: {}", error);
            let _ = apply_event(&state, JobEvent::Failed(JobError::Transport(error)));
        }
    }
}

async fn settle(state: &watch::Sender<JobState>, config: &JobConfig, payload: Value) {
    let _ = apply_event(state, JobEvent::ResponseReceived);

    if !config.settle_delay.is_zero() {
        tokio::time::sleep(config.settle_delay).await;
    }

    let event = match normalize(&payload) {
        Ok(result) => {
            info!(
                "Job completed: cycle of {} s across four approaches",
                result.cycle_seconds()
            );
            JobEvent::Completed(result)
        }
        Err(error) => {
            warn!("Job result rejected: {}", error);
            JobEvent::Failed(JobError::Validation(error))
        }
    };
    let _ = apply_event(state, event);
}
