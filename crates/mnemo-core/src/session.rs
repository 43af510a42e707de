//! Session handle and readiness signal
//!
//! The session itself is owned by the external identity provider; this
//! module only defines the shapes the client observes. [`Readiness`] is the
//! monotonic signal the whole request pipeline gates on: once `ready` flips
//! to true it never flips back, even when the session is later cleared by a
//! logout.

use serde::{Deserialize, Serialize};

/// Opaque identity handle observed from the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Owning user id
    pub user_id: String,
    /// Bearer credential for authorized requests
    pub access_token: String,
    /// Credential expiry (seconds since epoch), when the provider reports one
    pub expires_at: Option<u64>,
}

impl Session {
    /// Whether this session currently carries a usable bearer credential
    pub fn has_token(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// The readiness signal downstream consumers gate on.
///
/// Invariant: `ready` is monotonic. A failed bootstrap still produces
/// `ready=true, session=None` so consumers are never deadlocked; a logout
/// clears `session` without reverting `ready`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Readiness {
    /// Whether the session bootstrap has completed (successfully or not)
    pub ready: bool,
    /// The current session, if any
    pub session: Option<Session>,
}

impl Readiness {
    /// Readiness before the bootstrap has completed
    pub fn pending() -> Self {
        Self {
            ready: false,
            session: None,
        }
    }

    /// Readiness after the bootstrap, with whatever session it produced
    pub fn ready(session: Option<Session>) -> Self {
        Self {
            ready: true,
            session,
        }
    }
}

/// Session-change events pushed by the provider after bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A user signed in
    SignedIn(Session),
    /// The current session was refreshed (new credential, same user)
    Refreshed(Session),
    /// The user signed out
    SignedOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str) -> Session {
        Session {
            user_id: "u-1".into(),
            access_token: token.into(),
            expires_at: Some(1_700_000_000),
        }
    }

    #[test]
    fn empty_token_is_not_usable() {
        assert!(!session("").has_token());
        assert!(session("tok-abc").has_token());
    }

    #[test]
    fn pending_readiness_is_not_ready() {
        let readiness = Readiness::pending();
        assert!(!readiness.ready);
        assert!(readiness.session.is_none());
    }

    #[test]
    fn failed_bootstrap_readiness_is_still_ready() {
        let readiness = Readiness::ready(None);
        assert!(readiness.ready);
        assert!(readiness.session.is_none());
    }
}
