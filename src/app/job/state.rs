//! Job lifecycle state machine
//!
//! [`JobState::apply`] is the only place job state changes. It is a pure
//! function of the current state and one [`JobEvent`], so every transition
//! rule can be tested without timers or a network.

use std::fmt;

use tracing::{debug, warn};

use crate::app::models::{NormalizedResult, VideoFile};
use crate::constants::{job, progress};
use crate::errors::{JobError, ValidationError};

/// Position of a job in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobPhase {
    Idle,
    Uploading,
    Settling,
    Completed,
    Failed,
}

impl JobPhase {
    /// Completed or failed
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Failed)
    }

    /// Uploading or settling
    pub fn is_active(&self) -> bool {
        matches!(self, JobPhase::Uploading | JobPhase::Settling)
    }
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobPhase::Idle => "idle",
            JobPhase::Uploading => "uploading",
            JobPhase::Settling => "settling",
            JobPhase::Completed => "completed",
            JobPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Everything that can happen to a job
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    /// Replace the selection
    SelectFiles(Vec<VideoFile>),
    /// Start a job with the current selection
    Submit,
    /// Simulated progress value
    Progress(f64),
    /// The backend answered successfully
    ResponseReceived,
    /// Settling finished with a usable result
    Completed(NormalizedResult),
    /// The job failed
    Failed(JobError),
    /// Return a finished job to idle
    Reset,
    /// The running job was torn down before it finished
    Cancelled,
}

impl JobEvent {
    fn name(&self) -> &'static str {
        match self {
            JobEvent::SelectFiles(_) => "select_files",
            JobEvent::Submit => "submit",
            JobEvent::Progress(_) => "progress",
            JobEvent::ResponseReceived => "response_received",
            JobEvent::Completed(_) => "completed",
            JobEvent::Failed(_) => "failed",
            JobEvent::Reset => "reset",
            JobEvent::Cancelled => "cancelled",
        }
    }
}

/// Outcome of applying an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State changed
    Applied,
    /// Event had no effect in the current phase
    Ignored,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Observable state of the single job an orchestrator owns
#[derive(Debug, Clone, PartialEq)]
pub struct JobState {
    pub phase: JobPhase,
    /// 0 to 100
    pub progress: f64,
    pub selection: Vec<VideoFile>,
    /// Set only when completed
    pub result: Option<NormalizedResult>,
    /// Set only when failed
    pub error: Option<JobError>,
    /// Increments on every accepted submission
    pub job_id: u64,
}

impl Default for JobState {
    fn default() -> Self {
        Self {
            phase: JobPhase::Idle,
            progress: 0.0,
            selection: Vec::new(),
            result: None,
            error: None,
            job_id: 0,
        }
    }
}

impl JobState {
    /// Apply one event
    ///
    /// # Errors
    ///
    /// Only `Submit` can fail: outside `Idle` and the active phases, or with
    /// a selection that is not exactly four files. The state is unchanged on
    /// error.
    pub fn apply(&mut self, event: JobEvent) -> Result<Transition, JobError> {
        let event_name = event.name();
        let from = self.phase;

        let transition = match (self.phase, event) {
            (JobPhase::Idle, JobEvent::SelectFiles(files)) => {
                self.selection = files;
                Transition::Applied
            }

            (JobPhase::Idle, JobEvent::Submit) => {
                if self.selection.len() != job::REQUIRED_FILE_COUNT {
                    return Err(ValidationError::WrongFileCount {
                        expected: job::REQUIRED_FILE_COUNT,
                        actual: self.selection.len(),
                    }
                    .into());
                }
                self.phase = JobPhase::Uploading;
                self.progress = 0.0;
                self.result = None;
                self.error = None;
                self.job_id += 1;
                Transition::Applied
            }
            (phase, JobEvent::Submit) if phase.is_active() => Transition::Ignored,
            (phase, JobEvent::Submit) => {
                return Err(ValidationError::NotIdle { phase }.into());
            }

            (JobPhase::Uploading, JobEvent::Progress(value)) if value.is_finite() => {
                let next = value.min(progress::COMPLETE).max(self.progress);
                if next > self.progress {
                    self.progress = next;
                    Transition::Applied
                } else {
                    Transition::Ignored
                }
            }

            (JobPhase::Uploading, JobEvent::ResponseReceived) => {
                self.phase = JobPhase::Settling;
                self.progress = progress::COMPLETE;
                Transition::Applied
            }

            (JobPhase::Settling, JobEvent::Completed(result)) => {
                self.phase = JobPhase::Completed;
                self.result = Some(result);
                Transition::Applied
            }

            (phase, JobEvent::Failed(error)) if phase.is_active() => {
                self.phase = JobPhase::Failed;
                self.error = Some(error);
                Transition::Applied
            }

            (phase, JobEvent::Reset) if !phase.is_active() => {
                self.phase = JobPhase::Idle;
                self.progress = 0.0;
                self.result = None;
                self.error = None;
                Transition::Applied
            }

            (phase, JobEvent::Cancelled) if phase.is_active() => {
                self.phase = JobPhase::Idle;
                self.progress = 0.0;
                self.result = None;
                self.error = None;
                Transition::Applied
            }

            (_, JobEvent::Progress(_)) | (_, JobEvent::Cancelled) => Transition::Ignored,
            (phase, _) => {
                warn!("Ignoring {} event while {}", event_name, phase);
                Transition::Ignored
            }
        };

        if transition.is_applied() && from != self.phase {
            debug!("Job {}: {} -> {} on {}", self.job_id, from, self.phase, event_name);
        }

        Ok(transition)
    }
}
