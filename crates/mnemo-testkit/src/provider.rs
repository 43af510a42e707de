//! Scripted session provider
//!
//! Plays back a queue of scripted `current_session` outcomes, then a
//! configurable fallback forever after. Records when each lookup happened
//! (in virtual time under a paused runtime) so tests can assert the exact
//! backoff schedule between attempts.

use async_trait::async_trait;
use mnemo_client::{ProviderError, SessionEvents, SessionProvider};
use mnemo_core::{Session, SessionEvent};
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// One scripted lookup outcome.
#[derive(Debug, Clone)]
enum Outcome {
    Session(Session),
    Missing,
    Error(String),
}

/// Deterministic [`SessionProvider`] for tests.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Outcome>>,
    fallback: Mutex<Outcome>,
    call_times: Mutex<Vec<Instant>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SessionEvent>>>,
}

impl ScriptedProvider {
    /// A provider with no script and a "no session" fallback
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Outcome::Missing),
            call_times: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// A provider that always has a session carrying `token`
    pub fn signed_in(token: &str) -> Self {
        let provider = Self::new();
        provider.set_fallback_session(crate::session(token));
        provider
    }

    /// Script one "session exists" lookup
    pub fn push_session(&self, session: Session) {
        self.script.lock().push_back(Outcome::Session(session));
    }

    /// Script one "no session yet" lookup
    pub fn push_missing(&self) {
        self.script.lock().push_back(Outcome::Missing);
    }

    /// Script one provider failure
    pub fn push_error(&self, message: &str) {
        self.script
            .lock()
            .push_back(Outcome::Error(message.to_owned()));
    }

    /// Set the outcome returned once the script is exhausted
    pub fn set_fallback_session(&self, session: Session) {
        *self.fallback.lock() = Outcome::Session(session);
    }

    /// Push a session-change event to every subscriber
    pub fn emit(&self, event: SessionEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of `current_session` lookups so far
    pub fn calls(&self) -> usize {
        self.call_times.lock().len()
    }

    /// When each lookup happened (virtual time under a paused runtime)
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().clone()
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionProvider for ScriptedProvider {
    async fn current_session(&self) -> Result<Option<Session>, ProviderError> {
        self.call_times.lock().push(Instant::now());
        let outcome = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.lock().clone());
        match outcome {
            Outcome::Session(session) => Ok(Some(session)),
            Outcome::Missing => Ok(None),
            Outcome::Error(message) => Err(ProviderError::new(message)),
        }
    }

    fn subscribe(&self) -> SessionEvents {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().push(tx);
        SessionEvents::new(rx)
    }
}
