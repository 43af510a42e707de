//! Mnemo Core - Foundation types for the Mnemo client
//!
//! This crate provides the building blocks the rest of the client stack is
//! assembled from. It contains no I/O of its own:
//!
//! - [`ApiError`]: the closed, normalized error taxonomy every layer speaks
//! - [`Session`] / [`Readiness`]: the identity handle and the monotonic
//!   readiness signal derived from it
//! - [`ClientConfig`] / [`BackoffConfig`]: validated configuration and the
//!   deterministic retry schedules
//! - [`AbortSignal`]: cooperative cancellation shared by sleeps and requests
//!
//! Higher layers (mnemo-client, mnemo-app) depend on this crate; it depends
//! on nothing above the runtime.

/// Normalized error taxonomy and the server error envelope
pub mod errors;

/// Session handle, readiness signal, and provider-pushed session events
pub mod session;

/// Client configuration and backoff schedules
pub mod config;

/// Cooperative cancellation primitives
pub mod abort;

pub use abort::{AbortHandle, AbortSignal};
pub use config::{BackoffConfig, ClientConfig};
pub use errors::{ApiError, ErrorEnvelope};
pub use session::{Readiness, Session, SessionEvent};

/// Standard Result type for Mnemo client operations
pub type Result<T> = std::result::Result<T, ApiError>;
