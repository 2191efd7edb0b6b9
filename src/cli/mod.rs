//! Command-line interface components
//!
//! This module contains CLI-specific code for the junction client, including
//! argument parsing, progress display, text output and signal handling.

pub mod args;
pub mod commands;
pub mod output;
pub mod progress;
pub mod signals;

pub use args::{Cli, Commands, ConfigAction, ConfigArgs, GlobalArgs, HealthArgs, SubmitArgs};
pub use commands::{handle_config, handle_health, handle_stats, handle_submit};
pub use output::{format_error, format_health, format_job_error, format_result, format_stats};
pub use progress::JobProgressDisplay;
pub use signals::shutdown_requested;
