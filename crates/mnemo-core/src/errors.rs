//! Normalized error taxonomy for the Mnemo client
//!
//! Every failure that crosses a layer boundary in this workspace is one of
//! the [`ApiError`] variants below. Consumers match exhaustively; there is
//! no catch-all variant and no duck-typed probing of error shapes.
//!
//! Two attributes drive UI behavior:
//! - `silent`: the UI must not render a banner or toast for the error
//! - `retryable`: some layer above is allowed to retry the operation

use serde::{Deserialize, Serialize};

/// Server-supplied error envelope, layered under the HTTP status code.
///
/// All fields are optional; a non-JSON error body simply yields no envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Machine-readable error code
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Whether the UI should suppress a banner for this error
    #[serde(default)]
    pub silent: Option<bool>,
    /// Whether the server considers the failure retryable
    #[serde(default)]
    pub retryable: Option<bool>,
}

/// Normalized client error.
///
/// Construction is centralized in the request executor and token layers;
/// everything above consumes the variants exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// A credential could not yet be obtained because session bootstrap has
    /// not completed. Silent and retryable; expected during startup.
    #[error("session is not ready")]
    SessionNotReady,

    /// HTTP 401. Not retryable locally; a layer above this core redirects
    /// to the login flow.
    #[error("unauthorized: {message}")]
    Unauthorized {
        /// Server-supplied or fallback message
        message: String,
    },

    /// Transport-level failure (offline, DNS, TLS, connection reset).
    #[error("network error: {message}")]
    Network {
        /// Description of the transport failure
        message: String,
    },

    /// Non-2xx response other than 401, carrying whatever the server's
    /// error envelope supplied and falling back to the status text.
    #[error("request failed ({status}): {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Server error code, when the envelope carried one
        code: Option<String>,
        /// Server message or HTTP status text
        message: String,
        /// Envelope `silent` flag (default false)
        silent: bool,
        /// Envelope `retryable` flag (default false)
        retryable: bool,
    },

    /// Invalid or missing configuration (e.g. base URL). Fatal; raised
    /// immediately rather than retried.
    #[error("configuration error: {message}")]
    Config {
        /// What was wrong with the configuration
        message: String,
    },

    /// A 2xx body could not be deserialized into the requested type.
    #[error("decode error: {message}")]
    Decode {
        /// Deserialization failure description
        message: String,
    },

    /// The caller's abort signal fired. Silent: the consumer tore down,
    /// nobody is left to render it.
    #[error("operation aborted")]
    Aborted,
}

impl ApiError {
    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Normalize a non-2xx response into an error.
    ///
    /// Envelope fields win over the HTTP status text; 401 always maps to
    /// [`ApiError::Unauthorized`] regardless of the envelope.
    pub fn from_status(status: u16, status_text: &str, envelope: Option<ErrorEnvelope>) -> Self {
        let envelope = envelope.unwrap_or_default();
        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status_text.to_owned());

        if status == 401 {
            return Self::Unauthorized { message };
        }

        Self::Http {
            status,
            code: envelope.code,
            message,
            silent: envelope.silent.unwrap_or(false),
            retryable: envelope.retryable.unwrap_or(false),
        }
    }

    /// Short machine-readable code for this error
    pub fn code(&self) -> &str {
        match self {
            Self::SessionNotReady => "SESSION_NOT_READY",
            Self::Unauthorized { .. } => "UNAUTHORIZED",
            Self::Network { .. } => "NETWORK_ERROR",
            Self::Http { code, .. } => code.as_deref().unwrap_or("HTTP_ERROR"),
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Aborted => "ABORTED",
        }
    }

    /// Whether the UI must suppress a user-facing banner for this error
    pub fn is_silent(&self) -> bool {
        match self {
            Self::SessionNotReady | Self::Aborted => true,
            Self::Http { silent, .. } => *silent,
            Self::Unauthorized { .. }
            | Self::Network { .. }
            | Self::Config { .. }
            | Self::Decode { .. } => false,
        }
    }

    /// Whether a layer above is allowed to retry the failed operation
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::SessionNotReady => true,
            Self::Http { retryable, .. } => *retryable,
            Self::Network { .. } => true,
            Self::Unauthorized { .. }
            | Self::Config { .. }
            | Self::Decode { .. }
            | Self::Aborted => false,
        }
    }

    /// HTTP status code, when one applies
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Http { status, .. } => Some(*status),
            Self::SessionNotReady
            | Self::Network { .. }
            | Self::Config { .. }
            | Self::Decode { .. }
            | Self::Aborted => None,
        }
    }

    /// Message suitable for rendering to the user.
    ///
    /// Silent errors return `None`: no banner, no toast.
    pub fn user_message(&self) -> Option<String> {
        if self.is_silent() {
            return None;
        }
        Some(self.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_not_ready_is_silent_and_retryable() {
        let err = ApiError::SessionNotReady;
        assert_eq!(err.code(), "SESSION_NOT_READY");
        assert!(err.is_silent());
        assert!(err.is_retryable());
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn from_status_prefers_envelope_fields() {
        let envelope = ErrorEnvelope {
            code: Some("DECK_LOCKED".into()),
            message: Some("deck is locked by another reviewer".into()),
            silent: Some(false),
            retryable: Some(true),
        };
        let err = ApiError::from_status(409, "Conflict", Some(envelope));
        assert_eq!(err.code(), "DECK_LOCKED");
        assert_eq!(err.status(), Some(409));
        assert!(err.is_retryable());
        assert_eq!(
            err.to_string(),
            "request failed (409): deck is locked by another reviewer"
        );
    }

    #[test]
    fn from_status_falls_back_to_status_text() {
        let err = ApiError::from_status(503, "Service Unavailable", None);
        assert_eq!(err.code(), "HTTP_ERROR");
        assert_eq!(
            err.to_string(),
            "request failed (503): Service Unavailable"
        );
        assert!(!err.is_silent());
        assert!(!err.is_retryable());
    }

    #[test]
    fn status_401_maps_to_unauthorized() {
        let err = ApiError::from_status(401, "Unauthorized", None);
        assert_eq!(err.code(), "UNAUTHORIZED");
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_retryable());
        assert!(err.user_message().is_some());
    }

    #[test]
    fn empty_envelope_message_falls_back() {
        let envelope = ErrorEnvelope {
            message: Some(String::new()),
            ..Default::default()
        };
        let err = ApiError::from_status(500, "Internal Server Error", Some(envelope));
        assert_eq!(
            err.to_string(),
            "request failed (500): Internal Server Error"
        );
    }

    #[test]
    fn silent_http_error_has_no_user_message() {
        let envelope = ErrorEnvelope {
            silent: Some(true),
            message: Some("shadow rollout mismatch".into()),
            ..Default::default()
        };
        let err = ApiError::from_status(500, "Internal Server Error", Some(envelope));
        assert!(err.is_silent());
        assert_eq!(err.user_message(), None);
    }

    #[test]
    fn aborted_is_silent_not_retryable() {
        let err = ApiError::Aborted;
        assert!(err.is_silent());
        assert!(!err.is_retryable());
        assert_eq!(err.status(), None);
    }
}
