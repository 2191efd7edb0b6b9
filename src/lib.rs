//! Junction Client Library
//!
//! An async client for a remote junction-analysis service. It submits exactly
//! four intersection video feeds as one job, simulates bounded progress while
//! the slow remote analysis runs, normalizes the backend's result shapes into
//! per-direction green times, and tracks the backend's self-reported health.

pub mod app;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};
