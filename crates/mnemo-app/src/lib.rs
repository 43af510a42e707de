//! Mnemo App - Headless application state
//!
//! Portable, UI-free state for the Mnemo dashboard. View state is held as
//! immutable snapshots behind [`store::ViewStore`]; writes go through the
//! [`mutation::MutationCoordinator`] (optimistic apply, delta payload,
//! unconditional rollback on failure); the notification inbox is fed by
//! [`channel::NotificationChannel`] from a typed realtime stream.
//!
//! Frontends subscribe to the stores and call the workflow functions in
//! [`workflows`]; nothing in this crate renders anything.

/// Application-level errors (validation plus transported API errors)
pub mod errors;

/// Immutable-snapshot view store
pub mod store;

/// View state snapshot types
pub mod views;

/// Optimistic mutation coordinator
pub mod mutation;

/// User-facing operations over the coordinator and stores
pub mod workflows;

/// Realtime notification channel
pub mod channel;

pub use channel::{NotificationChannel, RealtimeSource, RealtimeSubscription, SubscriptionGuard};
pub use errors::AppError;
pub use mutation::{MutationCoordinator, MutationStatus};
pub use store::ViewStore;
pub use views::{
    FeatureFlag, FlagsState, NotificationEvent, NotificationsState, ReviewOrder, SettingsState,
};
