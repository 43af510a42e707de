//! Bounded-backoff credential acquisition
//!
//! One request needs one bearer token. During startup the session provider
//! may briefly have nothing to hand out, so this layer retries a small,
//! fixed number of times with short sleeps and then gives up with
//! `SessionNotReady` — silent and retryable, because the fetch layer above
//! runs its own slower retry loop and a visible error here would just be
//! bootstrap noise.

use crate::provider::SessionProvider;
use mnemo_core::{AbortSignal, ApiError, BackoffConfig};

/// Obtain a bearer credential for one request.
///
/// Up to `backoff.max_attempts` provider lookups; an absent session, an
/// empty token, and a provider error all count the same (one failed
/// attempt). Sleeps `min(max_delay, base_delay * 2^attempt)` between
/// attempts and never after the last one. The abort signal is checked
/// before every attempt and interrupts a pending sleep immediately.
pub async fn acquire_token(
    provider: &dyn SessionProvider,
    backoff: &BackoffConfig,
    signal: &AbortSignal,
) -> Result<String, ApiError> {
    for attempt in 0..backoff.max_attempts {
        if signal.is_aborted() {
            return Err(ApiError::Aborted);
        }

        match provider.current_session().await {
            Ok(Some(session)) if session.has_token() => {
                if attempt > 0 {
                    tracing::debug!(attempt, "credential available after retry");
                }
                return Ok(session.access_token);
            }
            Ok(_) => {
                tracing::debug!(attempt, "no usable credential yet");
            }
            Err(err) => {
                tracing::debug!(attempt, error = %err, "session provider lookup failed");
            }
        }

        let last_attempt = attempt + 1 == backoff.max_attempts;
        if !last_attempt {
            let delay = backoff.delay_for(attempt);
            tokio::select! {
                _ = signal.cancelled() => return Err(ApiError::Aborted),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    Err(ApiError::SessionNotReady)
}
