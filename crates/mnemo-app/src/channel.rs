//! Realtime notification channel
//!
//! Seeds the inbox from one undelivered-events fetch, then pumps a typed
//! push stream into the store. Inbound events are deduplicated by id and
//! acknowledged server-side on a best-effort basis: one attempt, failure
//! logged, the event stays visible either way.

use crate::store::ViewStore;
use crate::views::{NotificationEvent, NotificationsState};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use mnemo_client::{Method, RequestExecutor, RequestOptions};
use mnemo_core::ApiError;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Explicit unsubscribe handle for a realtime subscription.
///
/// Dropping the guard tears the subscription down; [`SubscriptionGuard::unsubscribe`]
/// does the same eagerly.
pub struct SubscriptionGuard(Option<Box<dyn FnOnce() + Send>>);

impl SubscriptionGuard {
    /// Wrap a teardown closure
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(teardown)))
    }

    /// Tear the subscription down now
    pub fn unsubscribe(mut self) {
        if let Some(teardown) = self.0.take() {
            teardown();
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(teardown) = self.0.take() {
            teardown();
        }
    }
}

/// A live subscription: the typed event stream plus its teardown handle.
pub struct RealtimeSubscription {
    /// Insert events, in arrival order
    pub events: BoxStream<'static, NotificationEvent>,
    /// Tears down the server-side subscription
    pub guard: SubscriptionGuard,
}

/// The push-stream boundary (external collaborator).
#[async_trait]
pub trait RealtimeSource: Send + Sync {
    /// Subscribe to insert events for one owner.
    async fn subscribe(&self, owner_id: &str) -> Result<RealtimeSubscription, ApiError>;
}

/// Owns the inbox pump for one owner id.
pub struct NotificationChannel {
    store: Arc<ViewStore<NotificationsState>>,
    executor: Arc<RequestExecutor>,
    pump: Option<JoinHandle<()>>,
    guard: Option<SubscriptionGuard>,
}

impl NotificationChannel {
    /// Seed the inbox and start pumping the push stream into it.
    pub async fn open(
        owner_id: &str,
        executor: Arc<RequestExecutor>,
        source: &dyn RealtimeSource,
        store: Arc<ViewStore<NotificationsState>>,
    ) -> Result<Self, ApiError> {
        let seed: Vec<NotificationEvent> = executor
            .execute(
                Method::Get,
                &format!("notifications?owner={owner_id}&undelivered=true"),
                None,
                &RequestOptions::default(),
            )
            .await?;
        store.set(NotificationsState::seeded(seed));

        let subscription = source.subscribe(owner_id).await?;
        tracing::info!(owner_id, "notification channel open");

        let pump = tokio::spawn(pump_events(
            subscription.events,
            Arc::clone(&store),
            Arc::clone(&executor),
        ));

        Ok(Self {
            store,
            executor,
            pump: Some(pump),
            guard: Some(subscription.guard),
        })
    }

    /// Remove an event locally and best-effort mark it delivered.
    pub fn dismiss(&self, id: &str) {
        self.store.update(|state| state.without(id));
        let executor = Arc::clone(&self.executor);
        let id = id.to_owned();
        tokio::spawn(async move {
            mark_delivered(&executor, &id).await;
        });
    }

    /// Stop the pump and tear down the subscription.
    pub fn close(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        if let Some(guard) = self.guard.take() {
            guard.unsubscribe();
        }
        tracing::debug!("notification channel closed");
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn pump_events(
    mut events: BoxStream<'static, NotificationEvent>,
    store: Arc<ViewStore<NotificationsState>>,
    executor: Arc<RequestExecutor>,
) {
    while let Some(event) = events.next().await {
        let id = event.id.clone();
        let inserted = store.modify(|state| {
            if state.contains(&id) {
                (state.clone(), false)
            } else {
                (state.with_prepended(event.clone()), true)
            }
        });

        if !inserted {
            tracing::debug!(%id, "duplicate realtime event dropped");
            continue;
        }

        // Fire-and-forget delivered mark; the event stays visible whether
        // or not this lands.
        let executor = Arc::clone(&executor);
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            if mark_delivered(&executor, &id).await {
                store.update(|state| state.with_delivered(&id));
            }
        });
    }
}

/// One delivered-mark attempt. Returns whether it landed.
async fn mark_delivered(executor: &RequestExecutor, id: &str) -> bool {
    let result = executor
        .execute_raw(
            Method::Post,
            &format!("notifications/{id}/delivered"),
            None,
            &RequestOptions::default(),
        )
        .await;
    match result {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(%id, error = %err, "delivered mark failed (best effort)");
            false
        }
    }
}
