//! Scripted HTTP transport
//!
//! Plays back a queue of scripted responses (optionally after a latency,
//! which matters for stale-response tests under a paused runtime) and
//! records every request for assertions. An exhausted script answers
//! `200 {}` so incidental requests do not fail tests that only count them.

use async_trait::async_trait;
use mnemo_client::{HttpRequest, HttpResponse, HttpTransport, TransportFailure};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;

/// One scripted exchange.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    result: Result<HttpResponse, TransportFailure>,
    latency: Duration,
}

impl ScriptedResponse {
    /// A `200` JSON response
    pub fn json(body: Value) -> Self {
        Self::status(200, body)
    }

    /// A JSON response with an arbitrary status
    pub fn status(status: u16, body: Value) -> Self {
        Self {
            result: Ok(HttpResponse {
                status,
                status_text: status_text(status).to_owned(),
                content_type: Some("application/json".to_owned()),
                body: body.to_string().into_bytes(),
            }),
            latency: Duration::ZERO,
        }
    }

    /// A plain-text response
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            result: Ok(HttpResponse {
                status,
                status_text: status_text(status).to_owned(),
                content_type: Some("text/plain".to_owned()),
                body: body.as_bytes().to_vec(),
            }),
            latency: Duration::ZERO,
        }
    }

    /// A connection-level failure
    pub fn network_error(message: &str) -> Self {
        Self {
            result: Err(TransportFailure::new(message)),
            latency: Duration::ZERO,
        }
    }

    /// Delay this exchange by `latency` before answering
    pub fn after(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Deterministic [`HttpTransport`] for tests.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<ScriptedResponse>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// A transport with an empty script
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Script an arbitrary exchange
    pub fn push(&self, response: ScriptedResponse) {
        self.script.lock().push_back(response);
    }

    /// Script a `200` JSON exchange
    pub fn push_json(&self, body: Value) {
        self.push(ScriptedResponse::json(body));
    }

    /// Script a JSON exchange with an arbitrary status
    pub fn push_status(&self, status: u16, body: Value) {
        self.push(ScriptedResponse::status(status, body));
    }

    /// Script a connection-level failure
    pub fn push_network_error(&self, message: &str) {
        self.push(ScriptedResponse::network_error(message));
    }

    /// Every request sent so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().clone()
    }

    /// Number of requests sent so far
    pub fn request_count(&self) -> usize {
        self.log.lock().len()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        self.log.lock().push(request);
        let scripted = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| ScriptedResponse::json(Value::Object(serde_json::Map::new())));
        if scripted.latency > Duration::ZERO {
            tokio::time::sleep(scripted.latency).await;
        }
        scripted.result
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}
