//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used to reach the junction-analysis backend.

use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{env as env_constants, http};
use crate::errors::{ConfigError, ConfigResult};

/// Configuration for the backend HTTP client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address every endpoint path is appended to
    pub base_url: String,
    /// Default deadline for a call that does not set its own
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: http::DEFAULT_BASE_URL.to_string(),
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            tcp_nodelay: true,
        }
    }
}

impl ClientConfig {
    /// Default configuration with the base address taken from the environment
    /// when `JUNCTION_API_URL` is set
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply the `JUNCTION_API_URL` override, if set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = env::var(env_constants::API_URL) {
            let value = value.trim();
            if !value.is_empty() {
                tracing::debug!("Using backend address from {}", env_constants::API_URL);
                self.base_url = value.to_string();
            }
        }
        self
    }

    /// Set the base address
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the default per-call deadline
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Parse and check the base address
    pub fn parsed_base_url(&self) -> ConfigResult<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "client.base_url".to_string(),
            value: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "client.base_url".to_string(),
                value: self.base_url.clone(),
                reason: "Only http and https addresses are supported".to_string(),
            });
        }

        Ok(url)
    }

    /// Builds the HTTP client with the specified configuration
    ///
    /// No client-wide request timeout is set; each call races its own deadline.
    pub fn build_http_client(&self) -> ConfigResult<Client> {
        let mut client_builder = Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .tcp_nodelay(self.tcp_nodelay);

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        // A backend on this machine is never reached through a proxy
        if self.parsed_base_url().is_ok_and(|url| is_loopback(&url)) {
            client_builder = client_builder.no_proxy();
        }

        client_builder
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "client".to_string(),
                value: "<http client>".to_string(),
                reason: e.to_string(),
            })
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.request_timeout, Duration::from_millis(15_000));
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_client_config_builders() {
        let config = ClientConfig::default()
            .with_base_url("http://10.0.0.2:8080")
            .with_request_timeout(Duration::from_secs(120));

        assert_eq!(config.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert!(config.tcp_nodelay); // Should inherit default values
    }

    #[test]
    fn test_base_url_validation() {
        assert!(ClientConfig::default().parsed_base_url().is_ok());

        let bad = ClientConfig::default().with_base_url("not a url");
        assert!(matches!(
            bad.parsed_base_url(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let ftp = ClientConfig::default().with_base_url("ftp://example.com");
        assert!(ftp.parsed_base_url().is_err());
    }

    #[test]
    fn test_loopback_detection() {
        let local = |base: &str| is_loopback(&Url::parse(base).unwrap());
        assert!(local("http://localhost:5000"));
        assert!(local("http://127.0.0.1:5000"));
        assert!(local("http://[::1]:5000"));
        assert!(!local("http://10.0.0.2:8080"));
        assert!(!local("https://junction.example.com"));
    }

    #[test]
    fn test_http_client_creation() {
        let config = ClientConfig::default();
        assert!(config.build_http_client().is_ok());
    }
}
