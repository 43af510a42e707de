//! User-facing operations over the coordinator and the view stores.
//!
//! Workflows validate input, drive the mutation coordinator, and reconcile
//! server-derived metadata back into view state. They are free functions so
//! frontends can call them directly.

pub mod flags;
pub mod settings;

pub use flags::toggle_flag;
pub use settings::save_settings;
