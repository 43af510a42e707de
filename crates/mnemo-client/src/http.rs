//! HTTP transport seam
//!
//! The executor speaks to the network through [`HttpTransport`]; production
//! uses [`ReqwestTransport`], tests substitute a scripted fake. A transport
//! failure here is connection-level only — a response with a 5xx status is
//! still a *response* and is normalized by the executor, not here.

use async_trait::async_trait;
use mnemo_core::ApiError;
use std::time::Duration;
use url::Url;

/// HTTP methods used by the Mnemo API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl Method {
    /// Wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One outbound request, fully resolved (absolute URL, auth header set).
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method
    pub method: Method,
    /// Absolute URL
    pub url: Url,
    /// Header name/value pairs, including `Authorization`
    pub headers: Vec<(String, String)>,
    /// JSON body, when the request carries one
    pub body: Option<serde_json::Value>,
    /// Wall-clock bound on this attempt
    pub timeout: Duration,
}

impl HttpRequest {
    /// Path component of the request URL (handy in logs and test asserts)
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// First value of a header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// One inbound response, body undecoded.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Status reason phrase (fallback error message)
    pub status_text: String,
    /// `Content-Type` header, when present
    pub content_type: Option<String>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the declared content type is JSON
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.split(';').next().unwrap_or("").trim() == "application/json")
    }
}

/// Connection-level failure: the request never produced a response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportFailure {
    /// Description of the failure
    pub message: String,
}

impl TransportFailure {
    /// Create a transport failure
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<TransportFailure> for ApiError {
    fn from(failure: TransportFailure) -> Self {
        ApiError::network(failure.message)
    }
}

/// The transport seam the executor sends through.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform one HTTP exchange.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

/// Production transport backed by a shared `reqwest` client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh client
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportFailure::new(format!("invalid method: {e}")))?;

        let mut builder = self
            .client
            .request(method, request.url.clone())
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportFailure::new(e.to_string()))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportFailure::new(format!("failed to read body: {e}")))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_owned(),
            content_type,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_content_type_detection() {
        let response = HttpResponse {
            status: 200,
            status_text: "OK".into(),
            content_type: Some("application/json; charset=utf-8".into()),
            body: Vec::new(),
        };
        assert!(response.is_json());

        let response = HttpResponse {
            content_type: Some("text/plain".into()),
            ..response
        };
        assert!(!response.is_json());
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = HttpRequest {
            method: Method::Get,
            url: Url::parse("https://api.mnemo.app/v1/decks").unwrap(),
            headers: vec![("Authorization".into(), "Bearer tok".into())],
            body: None,
            timeout: Duration::from_secs(30),
        };
        assert_eq!(request.header("authorization"), Some("Bearer tok"));
        assert_eq!(request.header("x-missing"), None);
    }
}
