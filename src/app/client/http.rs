//! Core HTTP operations with deadline enforcement
//!
//! This module issues a single request, races it against a deadline and
//! classifies the outcome into the transport error taxonomy. It never retries.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::{ApiRequest, RequestBody, UploadPart};
use crate::errors::{TransportError, TransportResult};

/// HTTP operations handler
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
}

impl HttpHandler {
    /// Creates a new HttpHandler around a configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Issues the request and races it against `timeout`
    ///
    /// When the deadline wins, the in-flight request future is dropped, which
    /// aborts the underlying connection.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Timeout` when the deadline elapses first,
    /// `Network` when no response arrived, `Http` for non-success statuses and
    /// `Parse` for a success body that is not JSON.
    pub async fn execute(
        &self,
        url: Url,
        request: ApiRequest,
        timeout: Duration,
    ) -> TransportResult<Value> {
        let method = request.method.clone();
        debug!("{} {} (timeout {} ms)", method, url, timeout.as_millis());

        match tokio::time::timeout(timeout, self.send(url.clone(), request, timeout)).await {
            Ok(Ok(value)) => {
                debug!("{} {} succeeded", method, url);
                Ok(value)
            }
            Ok(Err(e)) => {
                warn!("{} {} failed: {}", method, url, e);
                Err(e)
            }
            Err(_) => {
                warn!(
                    "{} {} aborted after {} ms deadline",
                    method,
                    url,
                    timeout.as_millis()
                );
                Err(TransportError::Timeout { timeout })
            }
        }
    }

    async fn send(
        &self,
        url: Url,
        request: ApiRequest,
        timeout: Duration,
    ) -> TransportResult<Value> {
        let mut builder = self.client.request(request.method, url);

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts).await?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, timeout))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(&e, timeout))?;

        classify_response(status, &bytes)
    }
}

/// Assemble the multipart form, reading every part from disk
async fn build_form(parts: Vec<UploadPart>) -> TransportResult<Form> {
    let mut form = Form::new();

    for upload in parts {
        let file = upload.file;
        let source = file.source.as_ref().ok_or_else(|| {
            TransportError::network(format!("No data source for video {}", file.name))
        })?;
        let bytes = tokio::fs::read(source).await.map_err(|e| {
            TransportError::network(format!("Failed to read {}: {}", source.display(), e))
        })?;
        debug!("Attaching {} ({} bytes) as '{}'", file.name, bytes.len(), upload.field);

        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| {
                TransportError::network(format!("Invalid MIME type for {}: {}", file.name, e))
            })?;
        form = form.part(upload.field, part);
    }

    Ok(form)
}

/// Turn a status code and raw body into a JSON value or a typed failure
///
/// Non-success bodies are parsed when possible so callers can inspect what the
/// server said; the message prefers the body's `error` string.
pub fn classify_response(status: StatusCode, bytes: &[u8]) -> TransportResult<Value> {
    if status.is_success() {
        return serde_json::from_slice(bytes).map_err(|e| TransportError::Parse {
            message: e.to_string(),
        });
    }

    let body: Option<Value> = serde_json::from_slice(bytes).ok();
    let message = body
        .as_ref()
        .and_then(|b| b.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed (HTTP {})", status.as_u16()));

    Err(TransportError::Http {
        status: status.as_u16(),
        message,
        body,
    })
}
