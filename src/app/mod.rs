//! Core application logic for the junction client
//!
//! This module contains the backend transport, the job orchestrator with its
//! progress simulation, result normalization and the health monitor.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use junction_client::app::{ApiClient, ClientConfig, HealthConfig, HealthMonitor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(ApiClient::new(&ClientConfig::from_env())?);
//!
//! let monitor = HealthMonitor::new(client, HealthConfig::default());
//! monitor.check_health().await;
//!
//! let health = monitor.snapshot();
//! println!("Backend is {}", health.status);
//! for (component, status) in &health.components {
//!     println!("  {}: {}", component, status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod health;
pub mod job;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod timer;

// Re-export main public API
pub use client::{ApiClient, ApiRequest, ClientConfig, RequestBody, Transport, UploadPart};
pub use health::{CheckOutcome, HealthConfig, HealthMonitor, HealthState, HealthStatus};
pub use job::{JobConfig, JobEvent, JobOrchestrator, JobPhase, JobState, Transition};
pub use models::{
    Direction, NormalizedResult, Recommendation, StatsSummary, VideoFile, mime_for_name,
};
pub use normalize::normalize;
pub use progress::{ProgressConfig, ProgressSimulator};
pub use timer::{FirstTick, TimerHandle, spawn_repeating};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Ensure public API is accessible
        let config = ClientConfig::default();
        assert!(config.tcp_nodelay);
        assert_eq!(JobState::default().phase, JobPhase::Idle);
        assert_eq!(HealthState::default().status, HealthStatus::Checking);
    }
}
