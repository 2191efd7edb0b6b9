//! Configuration management for the junction client
//!
//! This module provides unified configuration management with multi-source
//! loading and zero-config defaults. Every section has a TOML-friendly form
//! with plain integer durations that converts into the runtime configuration
//! of one component.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, HealthConfig, JobConfig, ProgressConfig};
use crate::constants::{env as env_constants, files, health, http, job, logging, progress};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Backend HTTP client settings
    pub client: ClientConfigToml,
    /// Job settings
    pub job: JobConfigToml,
    /// Simulated progress settings
    pub progress: ProgressConfigToml,
    /// Health monitor settings
    pub health: HealthConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Backend base address
    pub base_url: String,
    /// Default request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            base_url: http::DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: http::DEFAULT_TIMEOUT.as_millis() as u64,
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
            tcp_nodelay: true,
        }
    }
}

/// TOML-friendly job configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfigToml {
    /// Upload deadline in milliseconds
    pub request_timeout_ms: u64,
    /// Pause before the result is published, in milliseconds
    pub settle_delay_ms: u64,
}

impl Default for JobConfigToml {
    fn default() -> Self {
        Self {
            request_timeout_ms: http::DEFAULT_TIMEOUT.as_millis() as u64,
            settle_delay_ms: job::SETTLE_DELAY.as_millis() as u64,
        }
    }
}

/// TOML-friendly progress configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfigToml {
    /// Tick interval in milliseconds
    pub tick_interval_ms: u64,
    /// Largest single increment
    pub max_increment: f64,
    /// Highest simulated value
    pub cap: f64,
    /// Fixed seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for ProgressConfigToml {
    fn default() -> Self {
        Self {
            tick_interval_ms: progress::TICK_INTERVAL.as_millis() as u64,
            max_increment: progress::MAX_INCREMENT,
            cap: progress::CAP,
            seed: None,
        }
    }
}

/// TOML-friendly health configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfigToml {
    /// Poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Per-check timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HealthConfigToml {
    fn default() -> Self {
        Self {
            poll_interval_ms: health::POLL_INTERVAL.as_millis() as u64,
            timeout_ms: health::CHECK_TIMEOUT.as_millis() as u64,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
            colored_output: true,
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// CLI arguments are applied on top by the caller.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_file_override {
            Some(ref path) => Some(path.clone()),
            None => Self::find_config_file(),
        };

        let mut config = Self::default();
        if let Some(path) = config_path {
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                config = Self::load_from_file(&path).await?;
            } else if config_file_override.is_some() {
                return Err(ConfigError::NotFound { path });
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `JUNCTION_API_URL` when set and non-empty
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var(env_constants::API_URL) {
            let value = value.trim();
            if !value.is_empty() {
                debug!("Using backend address from {}", env_constants::API_URL);
                self.client.base_url = value.to_string();
            }
        }
    }

    /// Override the backend address
    pub fn with_api_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.base_url = base_url.into();
        self
    }

    /// Check every section for values the runtime cannot use
    pub fn validate(&self) -> ConfigResult<()> {
        let client = self.client_config();
        client.parsed_base_url()?;

        let invalid = |field: &str, value: String, reason: String| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            reason,
        };

        if self.client.request_timeout_ms == 0 {
            return Err(invalid(
                "client.request_timeout_ms",
                "0".to_string(),
                "Timeout cannot be zero".to_string(),
            ));
        }

        self.job_config()
            .validate()
            .map_err(|reason| invalid("job", format!("{:?}", self.job), reason))?;
        self.health_config()
            .validate()
            .map_err(|reason| invalid("health", format!("{:?}", self.health), reason))?;

        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(invalid(
                "logging.level",
                self.logging.level.clone(),
                "Expected one of error, warn, info, debug, trace".to_string(),
            ));
        }

        Ok(())
    }

    /// Runtime client configuration
    pub fn client_config(&self) -> ClientConfig {
        self.client.to_runtime_config()
    }

    /// Runtime job configuration, including progress simulation
    pub fn job_config(&self) -> JobConfig {
        JobConfig {
            request_timeout: Duration::from_millis(self.job.request_timeout_ms),
            settle_delay: Duration::from_millis(self.job.settle_delay_ms),
            progress: self.progress.to_runtime_config(),
        }
    }

    /// Runtime health configuration
    pub fn health_config(&self) -> HealthConfig {
        self.health.to_runtime_config()
    }

    /// Write the commented default configuration, refusing to overwrite
    ///
    /// Uses the user config directory when no path is given.
    pub async fn write_default(path: Option<PathBuf>, force: bool) -> ConfigResult<PathBuf> {
        let config_path = match path {
            Some(path) => path,
            None => Self::default_config_path()?,
        };

        if config_path.exists() && !force {
            return Err(ConfigError::InvalidValue {
                field: "path".to_string(),
                value: config_path.display().to_string(),
                reason: "File already exists; use --force to overwrite".to_string(),
            });
        }

        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|source| ConfigError::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
            }
        }

        tokio::fs::write(&config_path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: config_path.clone(),
                source,
            })?;

        info!("Wrote default configuration to {}", config_path.display());
        Ok(config_path)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(".").join(files::LOCAL_CONFIG_FILE)];
        if let Ok(path) = Self::default_config_path() {
            search_paths.push(path);
        }

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }

        debug!("No config file found in standard locations");
        None
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir
            .join(files::CONFIG_DIR_NAME)
            .join(files::CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# Junction Client Configuration
# You can customize any of these settings to suit your needs.
# The JUNCTION_API_URL environment variable overrides client.base_url.

[client]
# Backend base address
base_url = "{}"
# Default request timeout for calls without their own deadline
request_timeout_ms = {}
connect_timeout_secs = {}
pool_idle_timeout_secs = {}
tcp_nodelay = true

[job]
# Deadline for the video upload and analysis
request_timeout_ms = {}
# Pause at 100% before the result is shown
settle_delay_ms = {}

[progress]
# Simulated progress while the backend works
tick_interval_ms = {}
max_increment = {:.1}
cap = {:.1}
# seed = 42  # Uncomment for reproducible progress

[health]
poll_interval_ms = {}
timeout_ms = {}

[logging]
level = "{}"  # error, warn, info, debug, trace
colored_output = true
"#,
            http::DEFAULT_BASE_URL,
            http::DEFAULT_TIMEOUT.as_millis(),
            http::CONNECT_TIMEOUT.as_secs(),
            http::POOL_IDLE_TIMEOUT.as_secs(),
            http::DEFAULT_TIMEOUT.as_millis(),
            job::SETTLE_DELAY.as_millis(),
            progress::TICK_INTERVAL.as_millis(),
            progress::MAX_INCREMENT,
            progress::CAP,
            health::POLL_INTERVAL.as_millis(),
            health::CHECK_TIMEOUT.as_millis(),
            logging::DEFAULT_LOG_LEVEL,
        )
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            tcp_nodelay: self.tcp_nodelay,
        }
    }
}

impl ProgressConfigToml {
    /// Convert to runtime ProgressConfig
    pub fn to_runtime_config(&self) -> ProgressConfig {
        ProgressConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            max_increment: self.max_increment,
            cap: self.cap,
            seed: self.seed,
        }
    }
}

impl HealthConfigToml {
    /// Convert to runtime HealthConfig
    pub fn to_runtime_config(&self) -> HealthConfig {
        HealthConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}
