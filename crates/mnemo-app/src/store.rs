//! Immutable-snapshot view store
//!
//! State transitions are pure functions from one snapshot to the next;
//! readers clone the current snapshot and writers swap in a whole new one.
//! That is what makes the mutation rollback a mechanical identity check:
//! restoring a captured snapshot restores the state exactly.

use parking_lot::Mutex;
use tokio::sync::watch;

/// Snapshot store for one view document.
pub struct ViewStore<T> {
    current: Mutex<T>,
    tx: watch::Sender<T>,
}

impl<T: Clone + Send + Sync + 'static> ViewStore<T> {
    /// Create a store holding `initial`
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial.clone());
        Self {
            current: Mutex::new(initial),
            tx,
        }
    }

    /// Clone the current snapshot
    pub fn get(&self) -> T {
        self.current.lock().clone()
    }

    /// Replace the snapshot
    pub fn set(&self, next: T) {
        let mut current = self.current.lock();
        *current = next.clone();
        let _ = self.tx.send(next);
    }

    /// Apply a pure transition to the current snapshot
    pub fn update(&self, transition: impl FnOnce(&T) -> T) {
        let mut current = self.current.lock();
        let next = transition(&current);
        *current = next.clone();
        let _ = self.tx.send(next);
    }

    /// Apply a transition that also yields a result, atomically.
    pub fn modify<R>(&self, transition: impl FnOnce(&T) -> (T, R)) -> R {
        let mut current = self.current.lock();
        let (next, result) = transition(&current);
        *current = next.clone();
        let _ = self.tx.send(next);
        result
    }

    /// A receiver observing every snapshot change
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_is_a_pure_transition() {
        let store = ViewStore::new(vec![1, 2, 3]);
        store.update(|items| items.iter().map(|n| n * 2).collect());
        assert_eq!(store.get(), vec![2, 4, 6]);
    }

    #[test]
    fn restoring_a_snapshot_is_exact() {
        let store = ViewStore::new(String::from("before"));
        let snapshot = store.get();
        store.set(String::from("optimistic"));
        store.set(snapshot.clone());
        assert_eq!(store.get(), snapshot);
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let store = ViewStore::new(0u32);
        let mut rx = store.subscribe();
        store.set(7);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 7);
    }
}
