//! # Dashboard Settings View State

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Order in which due cards are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOrder {
    /// Oldest due first
    #[default]
    Due,
    /// Shuffled
    Random,
    /// Highest-priority deck first
    Priority,
}

/// The dashboard settings singleton.
///
/// `updated_at`/`updated_by` are server-derived metadata: never written by
/// the client, reconciled in by the silent refetch after a save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsState {
    /// Cards per day the user aims to review
    pub daily_goal: u32,
    /// Presentation order for due cards
    pub review_order: ReviewOrder,
    /// Whether the streak banner is shown
    pub show_streak: bool,
    /// IANA timezone the daily rollover is computed in
    pub timezone: String,
    /// Last change time (ms since epoch), server-derived
    #[serde(default)]
    pub updated_at: Option<u64>,
    /// Who last changed it, server-derived
    #[serde(default)]
    pub updated_by: Option<String>,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            daily_goal: 20,
            review_order: ReviewOrder::Due,
            show_streak: true,
            timezone: "UTC".to_owned(),
            updated_at: None,
            updated_by: None,
        }
    }
}

impl SettingsState {
    /// The writable fields as a JSON document (delta computation base).
    ///
    /// Server-derived metadata is excluded: the client never writes it.
    pub fn to_document(&self) -> serde_json::Value {
        json!({
            "daily_goal": self.daily_goal,
            "review_order": self.review_order,
            "show_streak": self.show_streak,
            "timezone": self.timezone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_excludes_server_metadata() {
        let settings = SettingsState {
            updated_at: Some(1_700_000_000_000),
            updated_by: Some("u-2".into()),
            ..Default::default()
        };
        let doc = settings.to_document();
        assert!(doc.get("daily_goal").is_some());
        assert!(doc.get("updated_at").is_none());
        assert!(doc.get("updated_by").is_none());
    }

    #[test]
    fn review_order_uses_snake_case_on_the_wire() {
        let value = serde_json::to_value(ReviewOrder::Priority).unwrap();
        assert_eq!(value, serde_json::Value::String("priority".into()));
    }
}
