//! Scripted realtime source
//!
//! Tests push events in; the channel under test receives them through the
//! same stream interface production uses. Supports one subscription per
//! instance and records teardown.

use async_trait::async_trait;
use mnemo_app::{NotificationEvent, RealtimeSource, RealtimeSubscription, SubscriptionGuard};
use mnemo_core::ApiError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Deterministic [`RealtimeSource`] for tests.
pub struct ScriptedRealtime {
    tx: mpsc::UnboundedSender<NotificationEvent>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<NotificationEvent>>>,
    unsubscribed: Arc<AtomicBool>,
    subscribed_owner: Mutex<Option<String>>,
}

impl ScriptedRealtime {
    /// A source with no events queued
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(Some(rx)),
            unsubscribed: Arc::new(AtomicBool::new(false)),
            subscribed_owner: Mutex::new(None),
        }
    }

    /// Deliver an event to the subscriber (or queue it until one exists)
    pub fn push(&self, event: NotificationEvent) {
        let _ = self.tx.send(event);
    }

    /// Whether the subscription has been torn down
    pub fn is_unsubscribed(&self) -> bool {
        self.unsubscribed.load(Ordering::SeqCst)
    }

    /// The owner id the channel subscribed with, if it has
    pub fn subscribed_owner(&self) -> Option<String> {
        self.subscribed_owner.lock().clone()
    }
}

impl Default for ScriptedRealtime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RealtimeSource for ScriptedRealtime {
    async fn subscribe(&self, owner_id: &str) -> Result<RealtimeSubscription, ApiError> {
        let rx = self
            .rx
            .lock()
            .take()
            .ok_or_else(|| ApiError::config("scripted realtime supports one subscription"))?;
        *self.subscribed_owner.lock() = Some(owner_id.to_owned());

        let unsubscribed = Arc::clone(&self.unsubscribed);
        Ok(RealtimeSubscription {
            events: Box::pin(UnboundedReceiverStream::new(rx)),
            guard: SubscriptionGuard::new(move || {
                unsubscribed.store(true, Ordering::SeqCst);
            }),
        })
    }
}
