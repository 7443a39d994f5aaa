//! History events
//!
//! Every entity embeds its own append-only history. Events are never
//! reordered or removed; the first event of every entity is `CREATED`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::WasteStatus;

/// Action tag of a history event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryAction {
    Created,
    StatusChanged,
}

/// A single lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub timestamp: DateTime<Utc>,
    pub action: HistoryAction,
    pub actor: String,
    pub details: String,
}

impl HistoryEvent {
    pub fn created(timestamp: DateTime<Utc>, actor: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            timestamp,
            action: HistoryAction::Created,
            actor: actor.into(),
            details: details.into(),
        }
    }

    /// STATUS_CHANGED event carrying before/after status in its details
    pub fn status_changed(
        timestamp: DateTime<Utc>,
        actor: impl Into<String>,
        from: WasteStatus,
        to: WasteStatus,
        note: &str,
    ) -> Self {
        let note = note.trim();
        let details = if note.is_empty() {
            format!("Status changed from {} to {}.", from, to)
        } else {
            format!("Status changed from {} to {}. {}", from, to, note)
        };
        Self {
            timestamp,
            action: HistoryAction::StatusChanged,
            actor: actor.into(),
            details,
        }
    }
}

/// True when `history` is well-formed: non-empty and starting with CREATED
pub fn starts_with_created(history: &[HistoryEvent]) -> bool {
    history
        .first()
        .map(|e| e.action == HistoryAction::Created)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_changed_details() {
        let now = Utc::now();
        let event = HistoryEvent::status_changed(
            now,
            "processor1",
            WasteStatus::Collected,
            WasteStatus::Processed,
            "Used for Olive Oil extraction",
        );
        assert_eq!(event.action, HistoryAction::StatusChanged);
        assert_eq!(
            event.details,
            "Status changed from COLLECTED to PROCESSED. Used for Olive Oil extraction"
        );

        let bare = HistoryEvent::status_changed(now, "a", WasteStatus::Processed, WasteStatus::Recycled, "  ");
        assert_eq!(bare.details, "Status changed from PROCESSED to RECYCLED.");
    }

    #[test]
    fn test_event_json_shape() {
        let event = HistoryEvent::created(Utc::now(), "farmer1", "Initial waste collection");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "CREATED");
        assert_eq!(json["actor"], "farmer1");
        assert!(json["timestamp"].is_string());
        assert!(starts_with_created(&[event]));
        assert!(!starts_with_created(&[]));
    }
}
