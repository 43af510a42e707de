//! Latest-wins fetch wrapper
//!
//! Every data-reading consumer sits behind a [`Fetcher`] instead of
//! re-deriving the same three-field state machine. The wrapper owns the two
//! ordering rules the UI depends on:
//!
//! - **discard-if-stale**: a response is applied only if it belongs to the
//!   most recently issued request (`request_id` equality at arrival time),
//!   so a slow old response can never overwrite a fast new one
//! - **`SessionNotReady` is the only retried error**, on its own schedule,
//!   with `is_loading` held true across attempts so the UI does not flicker
//!
//! Invariants: `request_id` increases strictly per issued request; at most
//! one non-cancelled timer exists per instance.

use crate::executor::{RequestExecutor, RequestOptions};
use crate::http::Method;
use futures::future::BoxFuture;
use mnemo_core::{AbortHandle, AbortSignal, ApiError, BackoffConfig};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Error surfaced when the session retry budget is exhausted.
const SESSION_EXHAUSTED_MESSAGE: &str = "could not prepare session";

/// Consumer-facing snapshot of one logical fetch.
#[derive(Debug, Clone)]
pub struct FetchState<T> {
    /// Most recently applied payload
    pub data: Option<T>,
    /// Whether a load (or a scheduled session retry) is outstanding
    pub is_loading: bool,
    /// User-visible error message, when one should be rendered
    pub error: Option<String>,
}

impl<T> FetchState<T> {
    fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

type LoadFn<T> = Arc<dyn Fn(AbortSignal) -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

struct RetryState {
    attempt: u32,
    request_id: u64,
    in_flight: bool,
    timer: Option<JoinHandle<()>>,
    detached: bool,
}

struct Inner<T> {
    load: LoadFn<T>,
    backoff: BackoffConfig,
    state: watch::Sender<FetchState<T>>,
    retry: Mutex<RetryState>,
    abort: AbortHandle,
}

/// One logical "fetch resource X" operation with latest-wins semantics.
pub struct Fetcher<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Fetcher<T> {
    /// Create a fetcher around an arbitrary load operation.
    ///
    /// Nothing is issued until [`Fetcher::refetch`] is called.
    pub fn new(
        backoff: BackoffConfig,
        load: impl Fn(AbortSignal) -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync + 'static,
    ) -> Self {
        let (state, _) = watch::channel(FetchState::idle());
        Self {
            inner: Arc::new(Inner {
                load: Arc::new(load),
                backoff,
                state,
                retry: Mutex::new(RetryState {
                    attempt: 0,
                    request_id: 0,
                    in_flight: false,
                    timer: None,
                    detached: false,
                }),
                abort: AbortHandle::new(),
            }),
        }
    }

    /// Convenience constructor for the common `GET path` consumer.
    pub fn for_path(executor: Arc<RequestExecutor>, path: impl Into<String>) -> Self
    where
        T: DeserializeOwned,
    {
        let backoff = executor.config().fetch_retry;
        let path = path.into();
        Self::new(backoff, move |signal| {
            let executor = executor.clone();
            let path = path.clone();
            Box::pin(async move {
                executor
                    .execute(Method::Get, &path, None, &RequestOptions::with_signal(signal))
                    .await
            })
        })
    }

    /// Current state snapshot
    pub fn state(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    /// A receiver observing every state change
    pub fn subscribe(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }

    /// Issue the load. A no-op while a request is already in flight.
    pub fn refetch(&self) {
        Inner::start(&self.inner);
    }

    /// The logical fetch changed (new parameters, new resource): retire the
    /// current request id so any in-flight response lands inert, then issue
    /// a fresh load immediately.
    pub fn restart(&self) {
        {
            let mut retry = self.inner.retry.lock();
            if retry.detached {
                return;
            }
            retry.request_id += 1;
            retry.in_flight = false;
            retry.attempt = 0;
            if let Some(timer) = retry.timer.take() {
                timer.abort();
            }
        }
        Inner::start(&self.inner);
    }

    /// Teardown: cancel the pending timer, retire the current request id,
    /// and abort the in-flight load. Late responses are inert afterwards.
    pub fn detach(&self) {
        self.inner.detach();
    }
}

impl<T> Drop for Fetcher<T> {
    fn drop(&mut self) {
        self.inner.detach();
    }
}

impl<T: Clone + Send + Sync + 'static> Inner<T> {
    fn start(self: &Arc<Self>) {
        let id = {
            let mut retry = self.retry.lock();
            if retry.detached || retry.in_flight {
                return;
            }
            retry.request_id += 1;
            retry.in_flight = true;
            if let Some(timer) = retry.timer.take() {
                timer.abort();
            }
            retry.request_id
        };

        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.run(id).await;
        });
    }

    async fn run(self: Arc<Self>, id: u64) {
        let signal = self.abort.signal();
        let result = (self.load)(signal).await;

        let mut retry = self.retry.lock();
        if retry.request_id != id {
            // A newer request owns the state now; this response is stale.
            tracing::debug!(request_id = id, "stale response discarded");
            return;
        }

        match result {
            Ok(data) => {
                retry.attempt = 0;
                retry.in_flight = false;
                drop(retry);
                self.state.send_modify(|state| {
                    state.data = Some(data);
                    state.is_loading = false;
                    state.error = None;
                });
            }
            Err(ApiError::SessionNotReady) => {
                retry.attempt += 1;
                retry.in_flight = false;
                if retry.attempt > self.backoff.max_attempts {
                    drop(retry);
                    tracing::warn!(attempts = self.backoff.max_attempts, "session retries exhausted");
                    self.state.send_modify(|state| {
                        state.is_loading = false;
                        state.error = Some(SESSION_EXHAUSTED_MESSAGE.to_owned());
                    });
                } else {
                    // is_loading stays true: the UI must not flicker
                    // between session retries.
                    let delay = self.backoff.delay_for(retry.attempt - 1);
                    let inner = Arc::clone(&self);
                    let cancel = self.abort.signal();
                    retry.timer = Some(tokio::spawn(async move {
                        tokio::select! {
                            _ = cancel.cancelled() => {}
                            _ = tokio::time::sleep(delay) => Inner::start(&inner),
                        }
                    }));
                }
            }
            Err(ApiError::Aborted) => {
                retry.in_flight = false;
                drop(retry);
                self.state.send_modify(|state| {
                    state.is_loading = false;
                });
            }
            Err(err) => {
                retry.attempt = 0;
                retry.in_flight = false;
                drop(retry);
                // Silent errors clear the loading flag without populating
                // a user-visible message.
                let message = err.user_message();
                self.state.send_modify(move |state| {
                    state.is_loading = false;
                    state.error = message;
                });
            }
        }
    }

}

impl<T> Inner<T> {
    fn detach(&self) {
        let mut retry = self.retry.lock();
        if retry.detached {
            return;
        }
        retry.detached = true;
        retry.request_id += 1;
        retry.in_flight = false;
        if let Some(timer) = retry.timer.take() {
            timer.abort();
        }
        drop(retry);
        self.abort.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn counting_fetcher(
        calls: Arc<AtomicU32>,
        latency: Duration,
    ) -> Fetcher<u32> {
        Fetcher::new(BackoffConfig::fetch_defaults(), move |_signal| {
            let calls = calls.clone();
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(latency).await;
                Ok(n)
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn refetch_while_in_flight_is_a_noop() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = counting_fetcher(calls.clone(), Duration::from_millis(50));

        fetcher.refetch();
        fetcher.refetch();
        fetcher.refetch();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetcher.state().data, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn detach_retires_in_flight_response() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = counting_fetcher(calls.clone(), Duration::from_millis(50));

        fetcher.refetch();
        tokio::time::sleep(Duration::from_millis(10)).await;
        fetcher.detach();

        tokio::time::sleep(Duration::from_millis(100)).await;
        let state = fetcher.state();
        assert_eq!(state.data, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn detached_fetcher_ignores_refetch() {
        let calls = Arc::new(AtomicU32::new(0));
        let fetcher = counting_fetcher(calls.clone(), Duration::from_millis(1));

        fetcher.detach();
        fetcher.refetch();
        fetcher.restart();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
