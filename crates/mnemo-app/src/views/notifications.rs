//! # Notifications View State

use serde::{Deserialize, Serialize};

/// One notification as delivered over HTTP or the realtime stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Server-assigned event id (dedup key)
    pub id: String,
    /// Short display text
    #[serde(default)]
    pub title: String,
    /// Display priority (higher sorts first at equal recency)
    #[serde(default)]
    pub priority: i32,
    /// Creation time (ms since epoch)
    pub created_at: u64,
    /// Whether delivery has been acknowledged
    #[serde(default)]
    pub delivered: bool,
}

/// Notification inbox state, most-recent-first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationsState {
    /// Visible events, newest first
    pub events: Vec<NotificationEvent>,
}

impl NotificationsState {
    /// Seed the inbox from the undelivered-events fetch, newest first.
    pub fn seeded(mut events: Vec<NotificationEvent>) -> Self {
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events.dedup_by(|a, b| a.id == b.id);
        Self { events }
    }

    /// Whether an event id is already visible
    pub fn contains(&self, id: &str) -> bool {
        self.events.iter().any(|event| event.id == id)
    }

    /// Pure transition: prepend an event unless its id is already present.
    pub fn with_prepended(&self, event: NotificationEvent) -> Self {
        if self.contains(&event.id) {
            return self.clone();
        }
        let mut events = Vec::with_capacity(self.events.len() + 1);
        events.push(event);
        events.extend(self.events.iter().cloned());
        Self { events }
    }

    /// Pure transition: mark one event delivered.
    pub fn with_delivered(&self, id: &str) -> Self {
        let events = self
            .events
            .iter()
            .map(|event| {
                if event.id == id {
                    NotificationEvent {
                        delivered: true,
                        ..event.clone()
                    }
                } else {
                    event.clone()
                }
            })
            .collect();
        Self { events }
    }

    /// Pure transition: remove an event.
    pub fn without(&self, id: &str) -> Self {
        let events = self
            .events
            .iter()
            .filter(|event| event.id != id)
            .cloned()
            .collect();
        Self { events }
    }

    /// Number of visible events not yet acknowledged
    pub fn unread(&self) -> usize {
        self.events.iter().filter(|event| !event.delivered).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, created_at: u64) -> NotificationEvent {
        NotificationEvent {
            id: id.into(),
            title: format!("event {id}"),
            priority: 0,
            created_at,
            delivered: false,
        }
    }

    #[test]
    fn seeding_orders_newest_first() {
        let state = NotificationsState::seeded(vec![event("a", 10), event("b", 30), event("c", 20)]);
        let ids: Vec<&str> = state.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn prepend_dedups_by_id() {
        let state = NotificationsState::default()
            .with_prepended(event("e1", 10))
            .with_prepended(event("e1", 10));
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn delivered_transition_is_idempotent() {
        let state = NotificationsState::seeded(vec![event("e1", 10)])
            .with_delivered("e1")
            .with_delivered("e1");
        assert!(state.events[0].delivered);
        assert_eq!(state.unread(), 0);
    }

    #[test]
    fn without_removes_only_the_named_event() {
        let state = NotificationsState::seeded(vec![event("e1", 10), event("e2", 20)]).without("e2");
        assert_eq!(state.events.len(), 1);
        assert_eq!(state.events[0].id, "e1");
    }
}
