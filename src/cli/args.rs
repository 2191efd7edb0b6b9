//! Command-line argument parsing for the junction client
//!
//! This module defines the CLI structure using clap derive macros: job
//! submission, backend health, run statistics and configuration management.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Junction client - submit intersection feeds for signal timing analysis
#[derive(Parser, Debug)]
#[command(
    name = "junction_client",
    version,
    about = "Submit four intersection videos for traffic signal timing analysis",
    long_about = "Client for the junction-analysis backend. Uploads one video feed per approach,
shows progress while the backend works, and prints the recommended green time for each direction."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Backend base address (overrides config and JUNCTION_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload four videos and wait for the timing analysis
    Submit(SubmitArgs),

    /// Show backend health
    Health(HealthArgs),

    /// Show statistics of past analysis runs
    Stats,

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the submit command
#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Four video files, one per approach (north, south, west, east)
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Upload deadline in seconds (overrides the configured job timeout)
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Seed for reproducible simulated progress
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for the health command
#[derive(Args, Debug, Clone)]
pub struct HealthArgs {
    /// Keep polling and print every change until Ctrl-C
    #[arg(short, long)]
    pub watch: bool,
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a commented default configuration file
    Init {
        /// Where to write the file (defaults to the user config directory)
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on global arguments
    ///
    /// `configured` applies when no verbosity flag is given.
    pub fn log_level(&self, configured: tracing::Level) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::ERROR
        } else if self.global.very_verbose {
            tracing::Level::DEBUG
        } else if self.global.verbose {
            tracing::Level::INFO
        } else {
            configured
        }
    }
}

impl SubmitArgs {
    /// Check the arguments before any file is touched
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == Some(0) {
            return Err("Timeout must be greater than 0 seconds".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit_args(count: usize) -> SubmitArgs {
        SubmitArgs {
            files: (0..count)
                .map(|i| PathBuf::from(format!("lane_{}.mp4", i)))
                .collect(),
            timeout: None,
            seed: None,
        }
    }

    #[test]
    fn test_submit_validation() {
        assert!(submit_args(4).validate().is_ok());
        // The file count is the orchestrator's call
        assert!(submit_args(3).validate().is_ok());

        let zero_timeout = SubmitArgs {
            timeout: Some(0),
            ..submit_args(4)
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_parse_submit_command() {
        let cli = Cli::try_parse_from([
            "junction_client",
            "--api-url",
            "http://10.0.0.5:5000",
            "submit",
            "n.mp4",
            "s.mp4",
            "w.mp4",
            "e.mp4",
            "--timeout",
            "120",
        ])
        .unwrap();

        assert_eq!(cli.global.api_url.as_deref(), Some("http://10.0.0.5:5000"));
        match cli.command {
            Commands::Submit(args) => {
                assert_eq!(args.files.len(), 4);
                assert_eq!(args.timeout, Some(120));
            }
            other => panic!("Expected submit, got {:?}", other),
        }
    }

    #[test]
    fn test_submit_requires_files() {
        assert!(Cli::try_parse_from(["junction_client", "submit"]).is_err());
    }

    #[test]
    fn test_parse_config_and_health() {
        let cli = Cli::try_parse_from(["junction_client", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config(ConfigArgs {
                action: ConfigAction::Init { force: true, path: None }
            })
        ));

        let cli = Cli::try_parse_from(["junction_client", "health", "--watch", "-v"]).unwrap();
        assert!(cli.global.verbose);
        assert!(matches!(cli.command, Commands::Health(HealthArgs { watch: true })));
    }

    #[test]
    fn test_log_level() {
        let cli_quiet = Cli::try_parse_from(["junction_client", "-q", "stats"]).unwrap();
        let cli_verbose = Cli::try_parse_from(["junction_client", "-v", "stats"]).unwrap();
        let cli_default = Cli::try_parse_from(["junction_client", "stats"]).unwrap();

        assert_eq!(cli_quiet.log_level(tracing::Level::WARN), tracing::Level::ERROR);
        assert_eq!(cli_verbose.log_level(tracing::Level::WARN), tracing::Level::INFO);
        assert_eq!(cli_default.log_level(tracing::Level::TRACE), tracing::Level::TRACE);
    }
}
