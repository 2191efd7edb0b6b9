//! Prelude module for the junction client library
//!
//! This module re-exports the most commonly used items from the library,
//! providing a convenient way to import everything needed for typical usage
//! with a single `use junction_client::prelude::*;` statement.
//!
//! # Usage
//!
//! ```rust,no_run
//! use junction_client::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load(None).await?;
//!     let client = Arc::new(ApiClient::new(&config.client_config())?);
//!
//!     let orchestrator = JobOrchestrator::new(Arc::clone(&client), config.job_config());
//!     let monitor = HealthMonitor::new(client, config.health_config());
//!     monitor.start();
//!
//!     // Select four videos and submit...
//!     # let _ = orchestrator;
//!     Ok(())
//! }
//! ```

// Core result types
pub use crate::errors::{AppError, ErrorKind, JobError, Result, TransportError, ValidationError};

// Essential app components that are used in most integrations
pub use crate::app::{
    // Transport
    ApiClient,
    ApiRequest,
    ClientConfig,
    Transport,

    // Jobs
    JobConfig,
    JobOrchestrator,
    JobPhase,
    JobState,
    ProgressConfig,
    Transition,

    // Health
    CheckOutcome,
    HealthConfig,
    HealthMonitor,
    HealthState,
    HealthStatus,

    // Data types
    Direction,
    NormalizedResult,
    Recommendation,
    StatsSummary,
    VideoFile,

    normalize,
};

pub use crate::config::AppConfig;

// Commonly used constants
pub use crate::constants::{DEFAULT_BASE_URL, ENV_API_URL, REQUIRED_FILE_COUNT, USER_AGENT};

// Standard library re-exports that are commonly needed
pub use std::path::{Path, PathBuf};
pub use std::sync::Arc;

// Common external crate re-exports for convenience
pub use tokio;
