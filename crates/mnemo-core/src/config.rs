//! Client configuration and deterministic backoff schedules

use crate::errors::ApiError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Deterministic capped-exponential backoff schedule.
///
/// `delay_for(retry)` computes `min(max_delay, base_delay * 2^retry)` where
/// `retry` is the zero-based index of the retry being scheduled. There is no
/// jitter: the schedule is part of the layer contract and tests assert the
/// exact delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Cap on the delay between retries
    pub max_delay: Duration,
}

impl BackoffConfig {
    /// Schedule used by token acquisition: 3 attempts, 500 ms base, 2 s cap
    pub fn token_defaults() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(2000),
        }
    }

    /// Schedule used by the latest-wins fetcher: 10 attempts, 250 ms base,
    /// 4 s cap
    pub fn fetch_defaults() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_millis(4000),
        }
    }

    /// Delay before retry number `retry` (zero-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(retry);
        self.base_delay
            .saturating_mul(multiplier)
            .min(self.max_delay)
    }
}

/// Validated configuration for the request pipeline.
///
/// Construction validates eagerly: an empty or unparseable base URL is a
/// [`ApiError::Config`] at startup, not a deferred failure inside the first
/// request.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: Url,
    /// Wall-clock bound on a single HTTP attempt
    pub request_timeout: Duration,
    /// Backoff schedule for credential acquisition
    pub token_retry: BackoffConfig,
    /// Backoff schedule for the latest-wins fetcher
    pub fetch_retry: BackoffConfig,
}

impl ClientConfig {
    /// Create a configuration from the API base URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        if base_url.trim().is_empty() {
            return Err(ApiError::config("base URL is not configured"));
        }
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::config(format!("invalid base URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::config(format!(
                "base URL {base_url} cannot carry request paths"
            )));
        }
        Ok(Self {
            base_url,
            request_timeout: Duration::from_secs(30),
            token_retry: BackoffConfig::token_defaults(),
            fetch_retry: BackoffConfig::fetch_defaults(),
        })
    }

    /// Override the per-attempt request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the token-acquisition backoff schedule
    pub fn with_token_retry(mut self, retry: BackoffConfig) -> Self {
        self.token_retry = retry;
        self
    }

    /// Override the fetcher backoff schedule
    pub fn with_fetch_retry(mut self, retry: BackoffConfig) -> Self {
        self.fetch_retry = retry;
        self
    }

    /// The configured base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::config(format!("invalid request path {path:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn token_schedule_is_500_then_1000() {
        let backoff = BackoffConfig::token_defaults();
        assert_eq!(backoff.delay_for(0), Duration::from_millis(500));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(1000));
        // Capped at 2000 from the third retry on
        assert_eq!(backoff.delay_for(2), Duration::from_millis(2000));
        assert_eq!(backoff.delay_for(10), Duration::from_millis(2000));
    }

    #[test]
    fn fetch_schedule_caps_at_4000() {
        let backoff = BackoffConfig::fetch_defaults();
        assert_eq!(backoff.delay_for(0), Duration::from_millis(250));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(500));
        assert_eq!(backoff.delay_for(2), Duration::from_millis(1000));
        assert_eq!(backoff.delay_for(4), Duration::from_millis(4000));
        assert_eq!(backoff.delay_for(9), Duration::from_millis(4000));
    }

    #[test]
    fn empty_base_url_is_a_config_error() {
        assert_matches!(ClientConfig::new("  "), Err(ApiError::Config { .. }));
        assert_matches!(ClientConfig::new("not a url"), Err(ApiError::Config { .. }));
    }

    #[test]
    fn endpoint_joins_paths() {
        let config = ClientConfig::new("https://api.mnemo.app/v1/").unwrap();
        let url = config.endpoint("/decks/review-stats").unwrap();
        assert_eq!(url.as_str(), "https://api.mnemo.app/v1/decks/review-stats");
    }
}
