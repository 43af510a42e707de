//! Optimistic mutation coordinator
//!
//! Every "toggle/save" write follows the same discipline: guard against a
//! double submit, capture a rollback snapshot, apply the optimistic value
//! synchronously, send only the fields that actually changed, and restore
//! the snapshot exactly if the write fails. The guard is per mutation key,
//! so no two writes for the same logical resource are ever in flight
//! concurrently.

use crate::store::ViewStore;
use mnemo_client::{Method, RequestExecutor, RequestOptions};
use mnemo_core::ApiError;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// How a mutation call concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    /// The write was issued and succeeded
    Completed,
    /// A mutation for this key was already pending; nothing was issued
    SkippedPending,
    /// The optimistic value did not differ from the last known server
    /// value; nothing was issued
    SkippedNoChanges,
}

/// Compute the delta payload: fields of `next` whose value differs from
/// `previous`. Both documents must be JSON objects (the writable-field
/// projections of the view snapshots).
pub fn delta_fields(previous: &Value, next: &Value) -> Map<String, Value> {
    let empty = Map::new();
    let previous = previous.as_object().unwrap_or(&empty);
    let next = next.as_object().unwrap_or(&empty);
    next.iter()
        .filter(|(key, value)| previous.get(*key) != Some(value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Everything about a write except the state it applies to.
pub struct MutationSpec<'a> {
    /// Double-submit guard key (one per logical resource)
    pub key: &'a str,
    /// Write method, usually PATCH
    pub method: Method,
    /// Write path
    pub path: &'a str,
    /// Payload fields carried alongside the delta (e.g. an audit reason);
    /// not part of view state, never rolled back
    pub extras: Map<String, Value>,
}

impl<'a> MutationSpec<'a> {
    /// A PATCH write with no extra payload fields
    pub fn patch(key: &'a str, path: &'a str) -> Self {
        Self {
            key,
            method: Method::Patch,
            path,
            extras: Map::new(),
        }
    }

    /// Attach extra payload fields
    pub fn with_extras(mut self, extras: Map<String, Value>) -> Self {
        self.extras = extras;
        self
    }
}

/// Coordinates optimistic writes against view stores.
pub struct MutationCoordinator {
    executor: Arc<RequestExecutor>,
    pending: Arc<Mutex<HashSet<String>>>,
}

impl MutationCoordinator {
    /// Create a coordinator over the shared executor
    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            executor,
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// The executor writes go through (workflows use it for silent
    /// refetches)
    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    /// Whether a mutation for `key` is currently pending
    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.lock().contains(key)
    }

    /// Run one optimistic mutation.
    ///
    /// `document` projects a snapshot onto its writable fields; the delta
    /// between the projections of the current and optimistic snapshots is
    /// the write payload.
    pub async fn mutate<T>(
        &self,
        spec: MutationSpec<'_>,
        store: &ViewStore<T>,
        optimistic: T,
        document: impl Fn(&T) -> Value,
    ) -> Result<MutationStatus, ApiError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let Some(_guard) = PendingGuard::try_begin(&self.pending, spec.key) else {
            tracing::debug!(key = spec.key, "mutation already pending, skipping");
            return Ok(MutationStatus::SkippedPending);
        };

        let previous = store.get();
        let mut payload = delta_fields(&document(&previous), &document(&optimistic));
        if payload.is_empty() {
            return Ok(MutationStatus::SkippedNoChanges);
        }
        payload.extend(spec.extras);

        // The UI reflects the change before the round-trip completes.
        store.set(optimistic.clone());

        let result = self
            .executor
            .execute_raw(
                spec.method,
                spec.path,
                Some(Value::Object(payload)),
                &RequestOptions::default(),
            )
            .await;

        match result {
            Ok(_) => Ok(MutationStatus::Completed),
            Err(err) => {
                // Unconditional rollback, independent of error kind: the
                // user must never keep seeing a value the server did not
                // persist.
                store.set(previous.clone());
                tracing::warn!(
                    key = spec.key,
                    optimistic = %document(&optimistic),
                    previous = %document(&previous),
                    error = %err,
                    "mutation failed, rolled back"
                );
                Err(err)
            }
        }
        // _guard drops here on every path, clearing the per-key flag.
    }
}

/// RAII entry in the pending set.
struct PendingGuard {
    pending: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl PendingGuard {
    fn try_begin(pending: &Arc<Mutex<HashSet<String>>>, key: &str) -> Option<Self> {
        let mut set = pending.lock();
        if !set.insert(key.to_owned()) {
            return None;
        }
        Some(Self {
            pending: Arc::clone(pending),
            key: key.to_owned(),
        })
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn delta_contains_only_changed_fields() {
        let previous = json!({"a": 1, "b": 2, "c": 3});
        let next = json!({"a": 1, "b": 5, "c": 3});
        let delta = delta_fields(&previous, &next);
        assert_eq!(Value::Object(delta), json!({"b": 5}));
    }

    #[test]
    fn new_fields_count_as_changed() {
        let previous = json!({"a": 1});
        let next = json!({"a": 1, "b": true});
        let delta = delta_fields(&previous, &next);
        assert_eq!(Value::Object(delta), json!({"b": true}));
    }

    #[test]
    fn identical_documents_produce_an_empty_delta() {
        let doc = json!({"a": [1, 2], "b": {"nested": "x"}});
        assert!(delta_fields(&doc, &doc).is_empty());
    }

    proptest! {
        /// Merging the delta into the previous document reproduces every
        /// field of the next document.
        #[test]
        fn delta_merged_into_previous_yields_next(
            base in proptest::collection::hash_map("[a-d]", 0i64..100, 0..4),
            edits in proptest::collection::hash_map("[a-d]", 0i64..100, 0..4),
        ) {
            let previous: Map<String, Value> =
                base.iter().map(|(k, v)| (k.clone(), json!(v))).collect();
            let mut next = previous.clone();
            for (k, v) in &edits {
                next.insert(k.clone(), json!(v));
            }

            let delta = delta_fields(&Value::Object(previous.clone()), &Value::Object(next.clone()));
            let mut merged = previous;
            merged.extend(delta);
            prop_assert_eq!(merged, next);
        }
    }
}
