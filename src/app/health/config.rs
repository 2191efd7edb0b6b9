//! Configuration for the health monitor

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::health;

/// Polling schedule and per-check deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Time between scheduled checks
    pub poll_interval: Duration,
    /// Deadline of one check
    pub timeout: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            poll_interval: health::POLL_INTERVAL,
            timeout: health::CHECK_TIMEOUT,
        }
    }
}

impl HealthConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval.is_zero() {
            return Err("Health poll interval cannot be zero".to_string());
        }
        if self.timeout.is_zero() {
            return Err("Health check timeout cannot be zero".to_string());
        }
        Ok(())
    }
}
