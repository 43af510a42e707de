//! # View State Module
//!
//! Snapshot types for the dashboard's view state. These are plain data:
//! serializable, cloneable, with pure transition helpers. All mutation goes
//! through the coordinator; nothing here touches the network.

pub mod flags;
pub mod notifications;
pub mod settings;

pub use flags::{FeatureFlag, FlagsState};
pub use notifications::{NotificationEvent, NotificationsState};
pub use settings::{ReviewOrder, SettingsState};
