//! Test utilities for the Mnemo client stack
//!
//! Scripted fakes for the three external boundaries — session provider,
//! HTTP transport, realtime stream — plus small builders for the fixtures
//! every test needs. All fakes are deterministic: they play back exactly
//! what the test scripted, and record what the code under test did.

/// Scripted session provider
pub mod provider;

/// Scripted HTTP transport
pub mod transport;

/// Scripted realtime source
pub mod realtime;

pub use provider::ScriptedProvider;
pub use realtime::ScriptedRealtime;
pub use transport::{ScriptedResponse, ScriptedTransport};

use mnemo_app::NotificationEvent;
use mnemo_core::Session;

/// A session fixture carrying `token`
pub fn session(token: &str) -> Session {
    Session {
        user_id: "user-test".to_owned(),
        access_token: token.to_owned(),
        expires_at: None,
    }
}

/// A notification fixture
pub fn notification(id: &str, created_at: u64) -> NotificationEvent {
    NotificationEvent {
        id: id.to_owned(),
        title: format!("notification {id}"),
        priority: 0,
        created_at,
        delivered: false,
    }
}

/// A notification fixture with a generated id
pub fn notification_now(created_at: u64) -> NotificationEvent {
    notification(&uuid::Uuid::new_v4().to_string(), created_at)
}

/// Install a compact tracing subscriber for a test run. Safe to call from
/// multiple tests; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
