//! Session readiness gate
//!
//! Pages gate their first fetches on this signal instead of racing the
//! asynchronous identity bootstrap. The state machine is
//! `BOOTSTRAPPING -> READY` with no way back: the bootstrap completing,
//! successfully or not, is what drives the transition, so a provider outage
//! yields `ready=true, session=None` rather than a permanently pending
//! page.

use crate::provider::SessionProvider;
use mnemo_core::{Readiness, SessionEvent};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Owns the bootstrap and the provider event pump; hands out watch
/// receivers for the readiness signal.
pub struct SessionReadyGate {
    rx: watch::Receiver<Readiness>,
    pump: Option<JoinHandle<()>>,
}

impl SessionReadyGate {
    /// Start the gate: one bootstrap fetch, then provider-pushed updates.
    ///
    /// Must be called within a runtime; the pump task lives until the gate
    /// is dropped or the provider closes its event stream.
    pub fn spawn(provider: Arc<dyn SessionProvider>) -> Self {
        let (tx, rx) = watch::channel(Readiness::pending());
        // Subscribe before the bootstrap so no change event is lost in the
        // window between the two.
        let mut events = provider.subscribe();

        let pump = tokio::spawn(async move {
            let readiness = match provider.current_session().await {
                Ok(session) => Readiness::ready(session),
                Err(err) => {
                    tracing::warn!(error = %err, "session bootstrap failed, proceeding without a session");
                    Readiness::ready(None)
                }
            };
            tracing::info!(signed_in = readiness.session.is_some(), "session gate ready");
            let _ = tx.send(readiness);

            while let Some(event) = events.recv().await {
                tx.send_modify(|state| {
                    // `ready` stays true through every transition, including
                    // sign-out.
                    match event {
                        SessionEvent::SignedIn(session) | SessionEvent::Refreshed(session) => {
                            state.session = Some(session);
                        }
                        SessionEvent::SignedOut => {
                            state.session = None;
                        }
                    }
                });
            }
            // Keep the channel open so late subscribers still observe the
            // final readiness value.
            futures::future::pending::<()>().await;
        });

        Self {
            rx,
            pump: Some(pump),
        }
    }

    /// Current readiness snapshot
    pub fn readiness(&self) -> Readiness {
        self.rx.borrow().clone()
    }

    /// A receiver observing every readiness change
    pub fn subscribe(&self) -> watch::Receiver<Readiness> {
        self.rx.clone()
    }

    /// Wait until the bootstrap has completed, then return the readiness.
    pub async fn wait_ready(&self) -> Readiness {
        let mut rx = self.rx.clone();
        let result = match rx.wait_for(|state| state.ready).await {
            Ok(state) => state.clone(),
            // Pump gone before ready: treat as a failed bootstrap.
            Err(_) => Readiness::ready(None),
        };
        result
    }
}

impl Drop for SessionReadyGate {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}
