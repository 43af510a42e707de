//! Session provider contract
//!
//! The identity provider (sign-in, token refresh, sign-out) lives outside
//! this workspace; the client only depends on this trait. A process holds
//! exactly one provider instance behind an `Arc` — duplicate instances would
//! race on refresh-token usage — and passes it explicitly to the gate and
//! the executor. There is no global.

use async_trait::async_trait;
use mnemo_core::{Session, SessionEvent};
use tokio::sync::mpsc;

/// Failure reported by the session provider itself.
///
/// Opaque by design: every provider failure is treated the same way by the
/// token layer (one failed attempt).
#[derive(Debug, Clone, thiserror::Error)]
#[error("session provider error: {message}")]
pub struct ProviderError {
    /// Provider-supplied description
    pub message: String,
}

impl ProviderError {
    /// Create a provider error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Handle on the provider's session-change stream.
///
/// Dropping the handle detaches the subscription.
pub struct SessionEvents {
    rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionEvents {
    /// Wrap a provider-side channel
    pub fn new(rx: mpsc::UnboundedReceiver<SessionEvent>) -> Self {
        Self { rx }
    }

    /// Next session event; `None` once the provider side is gone
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }
}

/// The external session provider seam.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session, if one exists.
    ///
    /// `Ok(None)` means "no session yet (or signed out)"; an error means the
    /// provider itself could not answer. Both count as a failed attempt for
    /// credential acquisition.
    async fn current_session(&self) -> Result<Option<Session>, ProviderError>;

    /// Subscribe to provider-pushed session changes.
    fn subscribe(&self) -> SessionEvents;
}
