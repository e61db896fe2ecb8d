//! Tracking event types and notification aggregation.
//!
//! Tracking events are an append-only engagement log. Notifications are not
//! stored separately: they are the notifiable subset of tracking events with a
//! per-reader read-state overlay.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingEventType {
    LinkOpened,
    RsvpSubmitted,
    RsvpUpdated,
    GuestAdded,
    InvitationSent,
    ReminderSent,
    MessageDelivered,
    MessageFailed,
    PaymentRecorded,
    TemplateUpdated,
}

impl TrackingEventType {
    pub const ALL: [Self; 10] = [
        Self::LinkOpened,
        Self::RsvpSubmitted,
        Self::RsvpUpdated,
        Self::GuestAdded,
        Self::InvitationSent,
        Self::ReminderSent,
        Self::MessageDelivered,
        Self::MessageFailed,
        Self::PaymentRecorded,
        Self::TemplateUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinkOpened => "LINK_OPENED",
            Self::RsvpSubmitted => "RSVP_SUBMITTED",
            Self::RsvpUpdated => "RSVP_UPDATED",
            Self::GuestAdded => "GUEST_ADDED",
            Self::InvitationSent => "INVITATION_SENT",
            Self::ReminderSent => "REMINDER_SENT",
            Self::MessageDelivered => "MESSAGE_DELIVERED",
            Self::MessageFailed => "MESSAGE_FAILED",
            Self::PaymentRecorded => "PAYMENT_RECORDED",
            Self::TemplateUpdated => "TEMPLATE_UPDATED",
        }
    }

    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown tracking event type '{s}'")))
    }

    /// Guest-originated events and delivery failures surface as notifications.
    pub fn is_notifiable(&self) -> bool {
        matches!(
            self,
            Self::LinkOpened
                | Self::RsvpSubmitted
                | Self::RsvpUpdated
                | Self::GuestAdded
                | Self::MessageFailed
        )
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Minimal view of a tracking event needed for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub id: DbId,
    pub event_type: TrackingEventType,
    pub family_id: Option<DbId>,
    pub family_name: Option<String>,
    pub channel: Option<String>,
    pub metadata: serde_json::Value,
    pub created_at: Timestamp,
}

/// A tracking event rendered as a notification for one reader.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationView {
    #[serde(flatten)]
    pub event: EventRecord,
    pub is_read: bool,
}

/// Query filter for the notification list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationFilter {
    pub event_type: Option<TrackingEventType>,
    pub family_id: Option<DbId>,
    #[serde(default)]
    pub unread_only: bool,
}

impl NotificationFilter {
    /// Event type names the feed may return. Asking for a type that never
    /// surfaces as a notification yields an empty list.
    pub fn event_types(&self) -> Vec<&'static str> {
        match self.event_type {
            Some(t) if t.is_notifiable() => vec![t.as_str()],
            Some(_) => Vec::new(),
            None => notifiable_types(),
        }
    }
}

/// Database names of every notifiable event type.
pub fn notifiable_types() -> Vec<&'static str> {
    TrackingEventType::ALL
        .into_iter()
        .filter(TrackingEventType::is_notifiable)
        .map(|t| t.as_str())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    pub total: i64,
    pub unread: i64,
}

/// Notification badge data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationSummary {
    pub total: i64,
    pub unread: i64,
    pub by_type: BTreeMap<TrackingEventType, TypeCount>,
}

/// Fold per-type counts into the badge summary. Types that are not
/// notifiable are ignored.
pub fn summarize(
    counts: impl IntoIterator<Item = (TrackingEventType, TypeCount)>,
) -> NotificationSummary {
    let mut summary = NotificationSummary::default();
    for (event_type, count) in counts {
        if !event_type.is_notifiable() {
            continue;
        }
        summary.total = summary.total.saturating_add(count.total);
        summary.unread = summary.unread.saturating_add(count.unread);
        let entry = summary.by_type.entry(event_type).or_default();
        entry.total = entry.total.saturating_add(count.total);
        entry.unread = entry.unread.saturating_add(count.unread);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_strings_round_trip() {
        for t in TrackingEventType::ALL {
            assert_eq!(TrackingEventType::from_str_db(t.as_str()).unwrap(), t);
        }
        assert!(TrackingEventType::from_str_db("NOPE").is_err());
    }

    #[test]
    fn admin_actions_are_not_notifications() {
        assert!(!TrackingEventType::ReminderSent.is_notifiable());
        assert!(!TrackingEventType::PaymentRecorded.is_notifiable());
        assert!(TrackingEventType::RsvpSubmitted.is_notifiable());
    }

    #[test]
    fn filter_narrows_event_types() {
        let all = NotificationFilter::default().event_types();
        assert_eq!(all.len(), 5);
        assert!(all.contains(&"RSVP_SUBMITTED"));
        assert!(!all.contains(&"REMINDER_SENT"));

        let one = NotificationFilter {
            event_type: Some(TrackingEventType::GuestAdded),
            ..Default::default()
        };
        assert_eq!(one.event_types(), vec!["GUEST_ADDED"]);

        let admin_only = NotificationFilter {
            event_type: Some(TrackingEventType::ReminderSent),
            ..Default::default()
        };
        assert!(admin_only.event_types().is_empty());
    }

    #[test]
    fn summary_counts_by_type() {
        let count = |total, unread| TypeCount { total, unread };
        let summary = summarize([
            (TrackingEventType::RsvpSubmitted, count(2, 2)),
            (TrackingEventType::LinkOpened, count(1, 0)),
            (TrackingEventType::ReminderSent, count(4, 4)),
        ]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unread, 2);
        assert_eq!(
            summary.by_type[&TrackingEventType::RsvpSubmitted],
            TypeCount { total: 2, unread: 2 }
        );
        assert_eq!(
            summary.by_type[&TrackingEventType::LinkOpened],
            TypeCount { total: 1, unread: 0 }
        );
        assert!(!summary.by_type.contains_key(&TrackingEventType::ReminderSent));
    }
}
