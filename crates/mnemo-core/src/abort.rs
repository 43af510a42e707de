//! Cooperative cancellation
//!
//! A cloneable [`AbortSignal`] is threaded through every asynchronous chain
//! in the pipeline: token-acquisition sleeps, in-flight requests, fetcher
//! retries. Aborting resolves all pending [`AbortSignal::cancelled`] futures
//! immediately, which is what lets a pending backoff sleep reject instead of
//! running to completion.

use tokio::sync::watch;

/// Owning side of a cancellation pair.
///
/// Dropping the handle without calling [`AbortHandle::abort`] leaves the
/// signal permanently un-aborted.
#[derive(Debug)]
pub struct AbortHandle {
    tx: watch::Sender<bool>,
}

impl AbortHandle {
    /// Create a new, un-aborted handle
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A signal observing this handle
    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn abort(&self) {
        let _ = self.tx.send(true);
    }
}

impl Default for AbortHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Observing side of a cancellation pair.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortSignal {
    /// A signal that never fires, for callers with no teardown path
    pub fn never() -> Self {
        // The sender drops immediately; `cancelled` treats a closed,
        // un-aborted channel as "never".
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Non-blocking cancellation check
    pub fn is_aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when cancellation is requested.
    ///
    /// If the handle is dropped without aborting, this pends forever.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Handle dropped un-aborted: cancellation can never arrive.
                futures::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn abort_resolves_pending_cancelled() {
        let handle = AbortHandle::new();
        let signal = handle.signal();
        assert!(!signal.is_aborted());

        let waiter = tokio::spawn({
            let signal = signal.clone();
            async move { signal.cancelled().await }
        });

        handle.abort();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(signal.is_aborted());
    }

    #[tokio::test]
    async fn abort_before_subscribe_is_visible() {
        let handle = AbortHandle::new();
        handle.abort();
        let signal = handle.signal();
        assert!(signal.is_aborted());
        signal.cancelled().await;
    }

    #[tokio::test(start_paused = true)]
    async fn never_signal_does_not_fire() {
        let signal = AbortSignal::never();
        let result = tokio::time::timeout(Duration::from_secs(60), signal.cancelled()).await;
        assert!(result.is_err());
    }
}
