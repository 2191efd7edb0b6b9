//! HTTP transport for the junction-analysis backend
//!
//! This module provides the single-call transport every other component is
//! built on: one request against a configured base address, raced against a
//! deadline, with failures converted into [`TransportError`].
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and building
//! - `http`: request execution, deadline racing and response classification
//!
//! Callers depend on the [`Transport`] trait rather than on [`ApiClient`]
//! directly, so the job orchestrator and health monitor can be driven by an
//! in-memory transport.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::app::models::{StatsSummary, VideoFile};
use crate::constants::endpoints;
use crate::errors::{ConfigResult, TransportError, TransportResult};

// Module declarations
pub mod config;
pub mod http;

pub use config::ClientConfig;

use http::HttpHandler;

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Multipart(Vec<UploadPart>),
}

/// One file part of a multipart body
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPart {
    pub field: String,
    pub file: VideoFile,
}

impl UploadPart {
    /// Part under the field the upload endpoint expects
    pub fn video(file: VideoFile) -> Self {
        Self {
            field: endpoints::UPLOAD_FIELD.to_string(),
            file,
        }
    }
}

/// A single backend call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base address, starting with `/`
    pub path: String,
    pub body: RequestBody,
    /// Per-call deadline; the transport default applies when `None`
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// GET request without a body
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    /// Job submission carrying every file under the `videos` field
    pub fn upload(files: &[VideoFile]) -> Self {
        Self {
            method: Method::POST,
            path: endpoints::UPLOAD.to_string(),
            body: RequestBody::Multipart(files.iter().cloned().map(UploadPart::video).collect()),
            timeout: None,
        }
    }

    /// Set the per-call deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A way to issue one backend call
pub trait Transport: Send + Sync {
    /// Issue the request and return the parsed JSON body
    fn call(&self, request: ApiRequest) -> BoxFuture<'_, TransportResult<Value>>;
}

/// HTTP client for the junction-analysis backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_handler: HttpHandler,
    base_url: Url,
    default_timeout: Duration,
}

impl ApiClient {
    /// Creates a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base address is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: &ClientConfig) -> ConfigResult<Self> {
        let base_url = config.parsed_base_url()?;
        let client = config.build_http_client()?;

        tracing::info!("Created backend client for {}", base_url);

        Ok(Self {
            http_handler: HttpHandler::new(client),
            base_url,
            default_timeout: config.request_timeout,
        })
    }

    /// Get the base address
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute target for a path
    ///
    /// The path is appended to the base address as text so a base carrying
    /// its own path prefix keeps it.
    pub fn url_for(&self, path: &str) -> TransportResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        };

        Url::parse(&joined)
            .map_err(|e| TransportError::network(format!("Invalid target {}: {}", joined, e)))
    }

    /// Submit one job's videos under the `videos` field
    pub async fn upload(&self, files: &[VideoFile], timeout: Duration) -> TransportResult<Value> {
        self.call(ApiRequest::upload(files).with_timeout(timeout))
            .await
    }

    /// Fetch the backend's own `{status, components}` report
    pub async fn health(&self, timeout: Duration) -> TransportResult<Value> {
        self.call(ApiRequest::get(endpoints::HEALTH).with_timeout(timeout))
            .await
    }

    /// Fetch the historical run summary
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Parse` if the body does not match the expected
    /// shape, or any failure of the underlying call
    pub async fn stats(&self) -> TransportResult<StatsSummary> {
        let value = self.call(ApiRequest::get(endpoints::STATS)).await?;
        serde_json::from_value(value).map_err(|e| TransportError::Parse {
            message: format!("Unexpected stats payload: {}", e),
        })
    }

    async fn execute(&self, request: ApiRequest) -> TransportResult<Value> {
        let url = self.url_for(&request.path)?;
        let timeout = request.timeout.unwrap_or(self.default_timeout);
        self.http_handler.execute(url, request, timeout).await
    }
}

impl Transport for ApiClient {
    fn call(&self, request: ApiRequest) -> BoxFuture<'_, TransportResult<Value>> {
        self.execute(request).boxed()
    }
}
