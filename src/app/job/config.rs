//! Configuration for the job orchestrator

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::progress::ProgressConfig;
use crate::constants::{http, job};

/// Configuration for running one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Deadline for the upload call
    pub request_timeout: Duration,
    /// Pause between the response arriving and the result being published
    pub settle_delay: Duration,
    /// Simulated progress while the upload is outstanding
    pub progress: ProgressConfig,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            request_timeout: http::DEFAULT_TIMEOUT,
            settle_delay: job::SETTLE_DELAY,
            progress: ProgressConfig::default(),
        }
    }
}

impl JobConfig {
    /// Set the upload deadline
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the settle delay
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the progress simulation
    pub fn with_progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout.is_zero() {
            return Err("Job request timeout cannot be zero".to_string());
        }
        self.progress.validate()
    }
}
