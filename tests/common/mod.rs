//! Shared fixtures for the integration tests
//!
//! [`ScriptedTransport`] answers each call with the next scripted reply and
//! honours the request deadline the way the HTTP client does, so the
//! orchestrator and monitor can be exercised under paused time.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::{json, Value};

use junction_client::app::{ApiRequest, Transport, VideoFile};
use junction_client::errors::{TransportError, TransportResult};

/// How the transport answers one call
#[derive(Debug, Clone)]
pub enum Reply {
    /// Resolve with the outcome once the delay has elapsed
    After(Duration, TransportResult<Value>),
    /// Never resolve; only the request deadline ends the call
    Never,
}

impl Reply {
    pub fn ok(delay: Duration, body: Value) -> Self {
        Reply::After(delay, Ok(body))
    }

    pub fn err(delay: Duration, error: TransportError) -> Self {
        Reply::After(delay, Err(error))
    }
}

/// In-memory transport driven by a reply script
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    requests: Mutex<Vec<ApiRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedTransport {
    /// Answer every call with the same reply
    pub fn always(reply: Reply) -> Self {
        Self::scripted(Vec::new(), reply)
    }

    /// Answer calls in order, then fall back to `fallback`
    pub fn scripted(replies: Vec<Reply>, fallback: Reply) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Number of calls issued so far
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request seen so far
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Highest number of calls that were outstanding at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self) -> Reply {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Transport for ScriptedTransport {
    fn call(&self, request: ApiRequest) -> BoxFuture<'_, TransportResult<Value>> {
        let reply = self.next_reply();
        let deadline = request.timeout;
        self.requests.lock().unwrap().push(request);

        async move {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            let _in_flight = InFlight(&self.in_flight);

            let answer = async {
                match reply {
                    Reply::After(delay, outcome) => {
                        tokio::time::sleep(delay).await;
                        outcome
                    }
                    Reply::Never => std::future::pending().await,
                }
            };

            match deadline {
                Some(timeout) => tokio::time::timeout(timeout, answer)
                    .await
                    .unwrap_or(Err(TransportError::Timeout { timeout })),
                None => answer.await,
            }
        }
        .boxed()
    }
}

/// `count` in-memory video descriptors
pub fn videos(count: usize) -> Vec<VideoFile> {
    (0..count)
        .map(|i| VideoFile::new(format!("lane_{}.mp4", i), 1024, "video/mp4"))
        .collect()
}

/// Flat success payload with a 39 s cycle
pub fn flat_payload() -> Value {
    json!({"north": 10, "south": 12, "west": 8, "east": 9})
}

/// Nested success payload carrying a recommendation
pub fn nested_payload() -> Value {
    json!({
        "result": {"north": 20.4, "south": 15, "west": "18", "east": 22},
        "rl_recommendation": {"direction": "East", "timer": 25, "reason": "queue building"}
    })
}

/// Healthy `/health` body
pub fn healthy_body() -> Value {
    json!({"status": "healthy", "components": {"api": "ok", "detector": "ok"}})
}
