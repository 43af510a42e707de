//! Request executor
//!
//! Performs exactly one HTTP call: resolve a credential, build the request,
//! read the response by content type, normalize failures. It deliberately
//! performs no retry of its own — retry policy belongs to the callers
//! (`Fetcher` for reads, the mutation coordinator for writes), which keeps
//! this layer idempotent-by-construction.

use crate::http::{HttpRequest, HttpTransport, Method};
use crate::provider::SessionProvider;
use crate::token::acquire_token;
use mnemo_core::{AbortSignal, ApiError, ClientConfig, ErrorEnvelope};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Per-call options.
#[derive(Clone)]
pub struct RequestOptions {
    /// Cancellation for this call (sleeps and the request itself)
    pub signal: AbortSignal,
    /// Extra headers appended after `Authorization`
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Options carrying an abort signal
    pub fn with_signal(signal: AbortSignal) -> Self {
        Self {
            signal,
            headers: Vec::new(),
        }
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            signal: AbortSignal::never(),
            headers: Vec::new(),
        }
    }
}

/// One-shot request pipeline over a provider and a transport.
pub struct RequestExecutor {
    config: ClientConfig,
    provider: Arc<dyn SessionProvider>,
    transport: Arc<dyn HttpTransport>,
}

impl RequestExecutor {
    /// Create an executor
    pub fn new(
        config: ClientConfig,
        provider: Arc<dyn SessionProvider>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config,
            provider,
            transport,
        }
    }

    /// The configuration this executor was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Execute a request and decode the JSON response into `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        opts: &RequestOptions,
    ) -> Result<T, ApiError> {
        let value = self.execute_raw(method, path, body.cloned(), opts).await?;
        serde_json::from_value(value).map_err(ApiError::from)
    }

    /// Execute a request and return the undecoded response document.
    ///
    /// JSON bodies are parsed; anything else comes back as a string value;
    /// an empty body is `null`.
    pub async fn execute_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        opts: &RequestOptions,
    ) -> Result<Value, ApiError> {
        if opts.signal.is_aborted() {
            return Err(ApiError::Aborted);
        }

        let token = acquire_token(
            self.provider.as_ref(),
            &self.config.token_retry,
            &opts.signal,
        )
        .await?;

        let url = self.config.endpoint(path)?;
        let mut headers = vec![("Authorization".to_owned(), format!("Bearer {token}"))];
        headers.extend(opts.headers.iter().cloned());

        let call_id = Uuid::new_v4();
        tracing::debug!(method = method.as_str(), path, %call_id, "dispatching request");

        let request = HttpRequest {
            method,
            url,
            headers,
            body,
            timeout: self.config.request_timeout,
        };

        let response = tokio::select! {
            _ = opts.signal.cancelled() => {
                tracing::debug!(%call_id, "request aborted");
                return Err(ApiError::Aborted);
            }
            result = self.transport.send(request) => result.map_err(ApiError::from)?,
        };

        let document = decode_body(&response.body, response.is_json());

        if !response.is_success() {
            let envelope = match &document {
                Value::Object(_) => {
                    serde_json::from_value::<ErrorEnvelope>(document.clone()).ok()
                }
                _ => None,
            };
            let err = ApiError::from_status(response.status, &response.status_text, envelope);
            tracing::warn!(
                status = response.status,
                code = err.code(),
                path,
                %call_id,
                "request failed"
            );
            return Err(err);
        }

        Ok(document)
    }
}

/// Decode a response body by its declared content type.
///
/// Parse failure is tolerated as `null` — a malformed error body must not
/// mask the status-derived error, and a malformed success body surfaces as
/// a decode error at the typed layer.
fn decode_body(body: &[u8], is_json: bool) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    if is_json {
        serde_json::from_slice(body).unwrap_or(Value::Null)
    } else {
        Value::String(String::from_utf8_lossy(body).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_decodes_to_null() {
        assert_eq!(decode_body(b"", true), Value::Null);
        assert_eq!(decode_body(b"", false), Value::Null);
    }

    #[test]
    fn malformed_json_is_tolerated_as_null() {
        assert_eq!(decode_body(b"{not json", true), Value::Null);
    }

    #[test]
    fn text_body_decodes_to_string() {
        assert_eq!(decode_body(b"maintenance", false), Value::String("maintenance".into()));
    }
}
