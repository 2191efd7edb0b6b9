//! Application constants for the junction client
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Environment variable overriding the backend base address
    pub const API_URL: &str = "JUNCTION_API_URL";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default backend base address
    pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("junction-client/", env!("CARGO_PKG_VERSION"));

    /// Default per-call deadline
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Backend endpoints
pub mod endpoints {
    /// Job submission
    pub const UPLOAD: &str = "/upload";

    /// Service self-report
    pub const HEALTH: &str = "/health";

    /// Historical run statistics
    pub const STATS: &str = "/stats";

    /// Multipart field name carrying each video
    pub const UPLOAD_FIELD: &str = "videos";
}

/// Job lifecycle constants
pub mod job {
    use super::Duration;

    /// Number of video feeds a job requires (one per approach)
    pub const REQUIRED_FILE_COUNT: usize = 4;

    /// Pause in `Settling` so observers can render the 100% state
    pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

    /// File extensions recognised as video feeds
    pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "flv", "wmv"];

    /// MIME prefix expected for video feeds
    pub const VIDEO_MIME_PREFIX: &str = "video/";
}

/// Simulated progress constants
pub mod progress {
    use super::Duration;

    /// Interval between simulated progress ticks
    pub const TICK_INTERVAL: Duration = Duration::from_millis(800);

    /// Upper bound (exclusive) of a single random increment
    pub const MAX_INCREMENT: f64 = 15.0;

    /// Highest value the simulator reaches before the real response arrives
    pub const CAP: f64 = 90.0;

    /// Value published once the response has arrived
    pub const COMPLETE: f64 = 100.0;
}

/// Health polling constants
pub mod health {
    use super::Duration;

    /// Interval between scheduled health checks
    pub const POLL_INTERVAL: Duration = Duration::from_millis(30_000);

    /// Deadline for a single health check
    pub const CHECK_TIMEOUT: Duration = Duration::from_millis(5_000);
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "warn";
}

/// Configuration file locations
pub mod files {
    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "junction-client.toml";

    /// Directory under the user config dir
    pub const CONFIG_DIR_NAME: &str = "junction-client";

    /// File name inside the user config dir
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

// Re-export commonly used constants for convenience
pub use endpoints::{HEALTH, STATS, UPLOAD};
pub use env::API_URL as ENV_API_URL;
pub use http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use job::REQUIRED_FILE_COUNT;
