//! Application-level errors
//!
//! Workflows can fail before any request is issued (input validation) or
//! because a request failed. The two are kept distinct so call sites can
//! tell "nothing happened, fix the input" from "the write failed and was
//! rolled back".

use mnemo_core::ApiError;

/// Error returned by workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    /// The operation was rejected before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// A request was issued and failed; view state has been rolled back.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AppError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Message suitable for rendering, when one should be rendered at all
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Validation(message) => Some(message.clone()),
            Self::Api(err) => err.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_always_visible() {
        let err = AppError::validation("a reason is required");
        assert_eq!(err.user_message().as_deref(), Some("a reason is required"));
    }

    #[test]
    fn silent_api_errors_stay_silent() {
        let err = AppError::from(ApiError::SessionNotReady);
        assert_eq!(err.user_message(), None);
    }
}
