//! Dashboard settings workflow

use crate::errors::AppError;
use crate::mutation::{MutationCoordinator, MutationSpec, MutationStatus};
use crate::store::ViewStore;
use crate::views::SettingsState;
use mnemo_client::{Method, RequestOptions};

/// Save edited dashboard settings optimistically.
///
/// Only fields whose value differs from the last known server state are
/// written. On success the authoritative document is silently refetched —
/// no loading flag, no flicker — so server-derived metadata (timestamps,
/// actor) reconciles into view state; a failed refetch is tolerated, the
/// optimistic state simply stands until the next load.
pub async fn save_settings(
    coordinator: &MutationCoordinator,
    store: &ViewStore<SettingsState>,
    edited: SettingsState,
) -> Result<MutationStatus, AppError> {
    let current = store.get();
    // Server-derived metadata is not writable; carry the current values
    // through the optimistic snapshot untouched.
    let optimistic = SettingsState {
        updated_at: current.updated_at,
        updated_by: current.updated_by.clone(),
        ..edited
    };

    let status = coordinator
        .mutate(
            MutationSpec::patch("settings", "settings"),
            store,
            optimistic,
            SettingsState::to_document,
        )
        .await?;

    if status == MutationStatus::Completed {
        refetch_silently(coordinator, store).await;
    }
    Ok(status)
}

/// Re-read the authoritative settings document without touching any
/// loading state.
async fn refetch_silently(coordinator: &MutationCoordinator, store: &ViewStore<SettingsState>) {
    let fetched = coordinator
        .executor()
        .execute::<SettingsState>(Method::Get, "settings", None, &RequestOptions::default())
        .await;

    match fetched {
        Ok(settings) => store.set(settings),
        Err(err) => {
            tracing::debug!(error = %err, "silent settings refetch failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemo_core::ClientConfig;
    use mnemo_client::RequestExecutor;
    use mnemo_testkit::{ScriptedProvider, ScriptedTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn coordinator(transport: Arc<ScriptedTransport>) -> MutationCoordinator {
        let config = ClientConfig::new("https://api.mnemo.app/v1/").unwrap();
        let provider = Arc::new(ScriptedProvider::signed_in("tok-1"));
        MutationCoordinator::new(Arc::new(RequestExecutor::new(config, provider, transport)))
    }

    #[tokio::test]
    async fn unchanged_settings_issue_no_request() {
        let transport = Arc::new(ScriptedTransport::new());
        let coordinator = coordinator(transport.clone());
        let store = ViewStore::new(SettingsState::default());

        let status = save_settings(&coordinator, &store, SettingsState::default())
            .await
            .unwrap();

        assert_eq!(status, MutationStatus::SkippedNoChanges);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn save_writes_only_the_changed_field_then_reconciles() {
        let transport = Arc::new(ScriptedTransport::new());
        // PATCH response, then the silent refetch document
        transport.push_json(json!({}));
        transport.push_json(json!({
            "daily_goal": 40,
            "review_order": "due",
            "show_streak": true,
            "timezone": "UTC",
            "updated_at": 1_700_000_123_000u64,
            "updated_by": "u-1",
        }));
        let coordinator = coordinator(transport.clone());
        let store = ViewStore::new(SettingsState::default());

        let edited = SettingsState {
            daily_goal: 40,
            ..SettingsState::default()
        };
        let status = save_settings(&coordinator, &store, edited).await.unwrap();
        assert_eq!(status, MutationStatus::Completed);

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method.as_str(), "PATCH");
        assert_eq!(requests[0].body, Some(json!({"daily_goal": 40})));
        assert_eq!(requests[1].method.as_str(), "GET");

        // Server metadata reconciled in by the silent refetch
        let state = store.get();
        assert_eq!(state.daily_goal, 40);
        assert_eq!(state.updated_by.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn failed_refetch_leaves_optimistic_state_standing() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(json!({}));
        transport.push_status(503, json!({"message": "warming up"}));
        let coordinator = coordinator(transport.clone());
        let store = ViewStore::new(SettingsState::default());

        let edited = SettingsState {
            show_streak: false,
            ..SettingsState::default()
        };
        let status = save_settings(&coordinator, &store, edited).await.unwrap();

        assert_eq!(status, MutationStatus::Completed);
        assert!(!store.get().show_streak);
    }
}
