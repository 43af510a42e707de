//! Feature flag workflow

use crate::errors::AppError;
use crate::mutation::{MutationCoordinator, MutationSpec, MutationStatus};
use crate::store::ViewStore;
use crate::views::FlagsState;
use serde_json::{json, Map};

/// Toggle a feature flag optimistically.
///
/// Disabling a flag marked `requires_reason_to_disable` demands a non-empty
/// reason; without one the call fails validation before any request is
/// issued and view state is untouched. The write payload is exactly the
/// `is_enabled` field, plus the reason when one was given.
pub async fn toggle_flag(
    coordinator: &MutationCoordinator,
    store: &ViewStore<FlagsState>,
    name: &str,
    enabled: bool,
    reason: Option<&str>,
) -> Result<MutationStatus, AppError> {
    let current = store.get();
    let flag = current
        .flag(name)
        .ok_or_else(|| AppError::validation(format!("unknown flag {name:?}")))?;

    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    if !enabled && flag.requires_reason_to_disable && reason.is_none() {
        return Err(AppError::validation(
            "a reason is required to disable this flag",
        ));
    }

    let mut extras = Map::new();
    if let Some(reason) = reason {
        extras.insert("reason".to_owned(), json!(reason));
    }

    let path = format!("flags/{name}");
    let key = format!("flag:{name}");
    let optimistic = current.with_flag_enabled(name, enabled);
    let flag_name = name.to_owned();

    let status = coordinator
        .mutate(
            MutationSpec::patch(&key, &path).with_extras(extras),
            store,
            optimistic,
            move |state: &FlagsState| {
                let enabled = state.flag(&flag_name).map(|flag| flag.is_enabled);
                json!({ "is_enabled": enabled })
            },
        )
        .await?;

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::FeatureFlag;
    use assert_matches::assert_matches;
    use mnemo_core::ClientConfig;
    use mnemo_client::RequestExecutor;
    use mnemo_testkit::{ScriptedProvider, ScriptedTransport};
    use std::sync::Arc;

    fn guarded_flag_state() -> FlagsState {
        FlagsState {
            flags: vec![FeatureFlag {
                name: "flag_engine_x".into(),
                description: "next-gen scheduling engine".into(),
                is_enabled: true,
                requires_reason_to_disable: true,
                updated_at: None,
                updated_by: None,
            }],
        }
    }

    fn coordinator(transport: Arc<ScriptedTransport>) -> MutationCoordinator {
        let config = ClientConfig::new("https://api.mnemo.app/v1/").unwrap();
        let provider = Arc::new(ScriptedProvider::signed_in("tok-1"));
        MutationCoordinator::new(Arc::new(RequestExecutor::new(config, provider, transport)))
    }

    #[tokio::test]
    async fn disabling_without_a_reason_issues_no_request() {
        let transport = Arc::new(ScriptedTransport::new());
        let coordinator = coordinator(transport.clone());
        let store = ViewStore::new(guarded_flag_state());

        let result = toggle_flag(&coordinator, &store, "flag_engine_x", false, None).await;

        assert_matches!(result, Err(AppError::Validation(_)));
        assert_eq!(transport.request_count(), 0);
        assert!(store.get().flag("flag_engine_x").unwrap().is_enabled);
    }

    #[tokio::test]
    async fn disabling_with_a_reason_sends_flag_and_reason() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(serde_json::json!({}));
        let coordinator = coordinator(transport.clone());
        let store = ViewStore::new(guarded_flag_state());

        let status = toggle_flag(
            &coordinator,
            &store,
            "flag_engine_x",
            false,
            Some("regression in retention cohort"),
        )
        .await
        .unwrap();

        assert_eq!(status, MutationStatus::Completed);
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path(), "/v1/flags/flag_engine_x");
        assert_eq!(
            requests[0].body,
            Some(serde_json::json!({
                "is_enabled": false,
                "reason": "regression in retention cohort",
            }))
        );
        assert!(!store.get().flag("flag_engine_x").unwrap().is_enabled);
    }

    #[tokio::test]
    async fn unknown_flag_fails_validation() {
        let transport = Arc::new(ScriptedTransport::new());
        let coordinator = coordinator(transport.clone());
        let store = ViewStore::new(guarded_flag_state());

        let result = toggle_flag(&coordinator, &store, "missing", true, None).await;
        assert_matches!(result, Err(AppError::Validation(_)));
        assert_eq!(transport.request_count(), 0);
    }
}
