//! Health state types

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Self-reported backend status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// No check has completed yet
    Checking,
    Healthy,
    Degraded,
    Offline,
}

impl HealthStatus {
    /// Map a reported status string
    ///
    /// Unknown strings are treated as degraded: the service answered, but
    /// not with a status we can vouch for.
    pub fn from_reported(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "healthy" => HealthStatus::Healthy,
            "degraded" => HealthStatus::Degraded,
            "offline" => HealthStatus::Offline,
            "checking" => HealthStatus::Checking,
            _ => HealthStatus::Degraded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Checking => "checking",
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known health of the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthState {
    pub status: HealthStatus,
    /// Subsystem name to free-form status
    pub components: BTreeMap<String, String>,
    /// When the most recent check completed
    pub last_checked: Option<DateTime<Utc>>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            status: HealthStatus::Checking,
            components: BTreeMap::new(),
            last_checked: None,
        }
    }
}

impl HealthState {
    /// Offline with no component detail
    pub fn offline(at: DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::Offline,
            components: BTreeMap::new(),
            last_checked: Some(at),
        }
    }
}

/// Result of requesting a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The check ran and produced this status
    Completed(HealthStatus),
    /// Another check was already in flight
    Skipped,
}

impl CheckOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, CheckOutcome::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(HealthStatus::from_reported("healthy"), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_reported("Degraded"), HealthStatus::Degraded);
        assert_eq!(HealthStatus::from_reported(" offline "), HealthStatus::Offline);
        assert_eq!(HealthStatus::from_reported("checking"), HealthStatus::Checking);
        assert_eq!(HealthStatus::from_reported("on fire"), HealthStatus::Degraded);
    }

    #[test]
    fn test_initial_state_is_checking() {
        let state = HealthState::default();
        assert_eq!(state.status, HealthStatus::Checking);
        assert!(state.components.is_empty());
        assert!(state.last_checked.is_none());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&HealthStatus::Healthy).unwrap();
        assert_eq!(json, "\"healthy\"");
    }
}
