//! Error types for the junction client
//!
//! This module defines the error types for every component of the client.
//! Transport failures keep enough detail (status code, parsed body) for callers
//! to tell validation rejections from server faults, and job errors stay
//! cloneable so they can live inside published job state.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::app::job::JobPhase;

/// Failures of a single backend call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// No response reached the client
    #[error("Network error: {message}")]
    Network { message: String },

    /// Deadline elapsed before a response arrived
    #[error("Request timed out after {} ms", timeout.as_millis())]
    Timeout { timeout: Duration },

    /// Server answered with a non-success status code
    #[error("{message} (HTTP {status})")]
    Http {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// Response body was not valid JSON
    #[error("Invalid response body: {message}")]
    Parse { message: String },
}

impl TransportError {
    /// Create a network error from anything printable
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Map a reqwest failure onto the transport taxonomy
    ///
    /// A connect failure is a `Network` error even when reqwest's connect
    /// timeout caused it; `Timeout` is kept for the per-call deadline.
    pub fn from_reqwest(error: &reqwest::Error, timeout: Duration) -> Self {
        Self::from_failure(RequestFailure::of(error), error.to_string(), timeout)
    }

    fn from_failure(failure: RequestFailure, message: String, timeout: Duration) -> Self {
        match failure {
            RequestFailure::Connect => Self::network(format!("Could not connect: {}", message)),
            RequestFailure::Deadline => Self::Timeout { timeout },
            RequestFailure::Decode => Self::Parse { message },
            RequestFailure::Other => Self::network(message),
        }
    }

    /// Whether the server answered with a 4xx status
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if (400..500).contains(status))
    }

    /// Whether the server answered with a 5xx status
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status >= 500)
    }
}

/// Stage at which reqwest gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestFailure {
    Connect,
    Deadline,
    Decode,
    Other,
}

impl RequestFailure {
    fn of(error: &reqwest::Error) -> Self {
        // Connect timeouts also report is_timeout; connecting is checked first
        if error.is_connect() {
            RequestFailure::Connect
        } else if error.is_timeout() {
            RequestFailure::Deadline
        } else if error.is_decode() {
            RequestFailure::Decode
        } else {
            RequestFailure::Other
        }
    }
}

/// Input or payload validation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Selection does not hold the required number of videos
    #[error("Please upload exactly {expected} videos (got {actual})")]
    WrongFileCount { expected: usize, actual: usize },

    /// Submission attempted outside the idle phase
    #[error("Cannot submit while the job is {phase}; reset it first")]
    NotIdle { phase: JobPhase },

    /// Success payload is missing data or has the wrong shape
    #[error("Malformed result payload: {reason}")]
    MalformedPayload { reason: String },

    /// Backend reported its own failure inside a success payload
    #[error("{message}")]
    BackendReported { message: String },
}

/// Discriminant of a [`JobError`], matching the error taxonomy shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Network,
    Timeout,
    Http,
    Parse,
}

impl ErrorKind {
    /// Stable name for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Network => "network",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Http => "http",
            ErrorKind::Parse => "parse",
        }
    }
}

/// Terminal error of a job
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl JobError {
    /// Error kind for display and branching
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::Validation(_) => ErrorKind::Validation,
            JobError::Transport(TransportError::Network { .. }) => ErrorKind::Network,
            JobError::Transport(TransportError::Timeout { .. }) => ErrorKind::Timeout,
            JobError::Transport(TransportError::Http { .. }) => ErrorKind::Http,
            JobError::Transport(TransportError::Parse { .. }) => ErrorKind::Parse,
        }
    }

    /// Human-readable message for presentation
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status code, for HTTP failures
    pub fn status_code(&self) -> Option<u16> {
        match self {
            JobError::Transport(TransportError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Parsed response body, for HTTP failures that carried one
    pub fn body(&self) -> Option<&Value> {
        match self {
            JobError::Transport(TransportError::Http { body, .. }) => body.as_ref(),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("Failed to render configuration")]
    Render(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Could not determine where the user configuration lives
    #[error("Could not determine user config directory")]
    NoConfigDir,

    /// File I/O error
    #[error("Configuration file I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Job error
    #[error(transparent)]
    Job(#[from] JobError),

    /// Transport error outside a job (health, stats)
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        AppError::Job(JobError::Validation(error))
    }
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Job(JobError::Transport(e)) | AppError::Transport(e) => match e {
                TransportError::Network { .. } | TransportError::Timeout { .. } => true,
                TransportError::Http { .. } => e.is_server_error(),
                TransportError::Parse { .. } => false,
            },
            AppError::Job(JobError::Validation(_)) | AppError::Config(_) => false,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Job(e) => e.kind().as_str(),
            AppError::Transport(_) => "transport",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Transport result type alias
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Job result type alias
pub type JobResult<T> = std::result::Result<T, JobError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_kinds() {
        let timeout = JobError::from(TransportError::Timeout {
            timeout: Duration::from_millis(50),
        });
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(timeout.status_code(), None);
        assert_eq!(timeout.message(), "Request timed out after 50 ms");

        let validation = JobError::from(ValidationError::WrongFileCount {
            expected: 4,
            actual: 2,
        });
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert_eq!(validation.message(), "Please upload exactly 4 videos (got 2)");
    }

    #[test]
    fn test_http_error_carries_status_and_body() {
        let body = serde_json::json!({"error": "Please upload exactly 4 videos"});
        let error = JobError::from(TransportError::Http {
            status: 400,
            message: "Please upload exactly 4 videos".to_string(),
            body: Some(body.clone()),
        });

        assert_eq!(error.kind(), ErrorKind::Http);
        assert_eq!(error.status_code(), Some(400));
        assert_eq!(error.body(), Some(&body));
        assert_eq!(error.message(), "Please upload exactly 4 videos (HTTP 400)");
    }

    #[test]
    fn test_connect_failure_is_network_error() {
        let deadline = Duration::from_secs(15);
        let error = TransportError::from_failure(
            RequestFailure::Connect,
            "operation timed out".to_string(),
            deadline,
        );
        assert_eq!(
            error,
            TransportError::network("Could not connect: operation timed out")
        );

        let timeout = TransportError::from_failure(
            RequestFailure::Deadline,
            "operation timed out".to_string(),
            deadline,
        );
        assert_eq!(timeout, TransportError::Timeout { timeout: deadline });

        let decode =
            TransportError::from_failure(RequestFailure::Decode, "bad body".to_string(), deadline);
        assert!(matches!(decode, TransportError::Parse { .. }));
    }

    #[test]
    fn test_client_and_server_error_classification() {
        let client = TransportError::Http {
            status: 422,
            message: "bad".to_string(),
            body: None,
        };
        let server = TransportError::Http {
            status: 503,
            message: "down".to_string(),
            body: None,
        };
        assert!(client.is_client_error());
        assert!(!client.is_server_error());
        assert!(server.is_server_error());
        assert!(!TransportError::network("refused").is_client_error());
    }

    #[test]
    fn test_app_error_recoverability() {
        let transient = AppError::Transport(TransportError::network("connection refused"));
        assert!(transient.is_recoverable());
        assert_eq!(transient.category(), "transport");

        let rejected = AppError::from(ValidationError::WrongFileCount {
            expected: 4,
            actual: 1,
        });
        assert!(!rejected.is_recoverable());
        assert_eq!(rejected.category(), "validation");
    }
}
