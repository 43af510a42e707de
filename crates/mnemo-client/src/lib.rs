//! Mnemo Client - Session-gated request pipeline
//!
//! The layers, bottom to top:
//!
//! - [`provider::SessionProvider`]: the seam to the external identity
//!   provider; injected once per process, never a module-level singleton
//! - [`gate::SessionReadyGate`]: one bootstrap fetch plus a provider event
//!   pump feeding a monotonic readiness signal
//! - [`token::acquire_token`]: bounded-backoff credential acquisition that
//!   collapses every miss into `ApiError::SessionNotReady`
//! - [`executor::RequestExecutor`]: one HTTP call, normalized errors, no
//!   retry of its own
//! - [`fetch::Fetcher`]: the latest-wins wrapper data-reading consumers sit
//!   behind, and the only layer allowed to retry `SessionNotReady`

/// Session provider contract (external collaborator seam)
pub mod provider;

/// Session readiness gate
pub mod gate;

/// Bounded-backoff credential acquisition
pub mod token;

/// HTTP transport seam and the production reqwest implementation
pub mod http;

/// The request executor: one call, normalized errors, no retry
pub mod executor;

/// Latest-wins fetch wrapper for data-reading consumers
pub mod fetch;

pub use executor::{RequestExecutor, RequestOptions};
pub use fetch::{FetchState, Fetcher};
pub use gate::SessionReadyGate;
pub use http::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport, TransportFailure};
pub use provider::{ProviderError, SessionEvents, SessionProvider};
pub use token::acquire_token;
