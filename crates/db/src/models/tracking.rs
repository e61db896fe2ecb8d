//! Tracking events and notification read state.

use serde::Serialize;
use sqlx::FromRow;
use vowline_core::types::{DbId, Timestamp};

/// A row from `tracking_events`, joined with the family name when present.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrackingEventRow {
    pub id: DbId,
    pub wedding_id: DbId,
    pub family_id: Option<DbId>,
    pub family_name: Option<String>,
    pub event_type: String,
    pub channel: Option<String>,
    pub metadata: serde_json::Value,
    pub admin_triggered: bool,
    pub created_at: Timestamp,
}

/// A tracking event with the reader's read state.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    #[sqlx(flatten)]
    pub event: TrackingEventRow,
    pub is_read: bool,
}

/// Notification totals for one event type and reader.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationCountRow {
    pub event_type: String,
    pub total: i64,
    pub unread: i64,
}

/// Filter for one page of the notification feed. Every predicate is applied
/// in SQL before the limit.
#[derive(Debug, Clone)]
pub struct NotificationQuery<'a> {
    pub reader_email: &'a str,
    /// Event type names to include. An empty list matches nothing.
    pub event_types: &'a [&'static str],
    pub family_id: Option<DbId>,
    pub unread_only: bool,
    pub since: Option<Timestamp>,
    pub limit: i64,
}

/// Insert DTO for a tracking event.
#[derive(Debug, Clone)]
pub struct NewTrackingEvent {
    pub wedding_id: DbId,
    pub family_id: Option<DbId>,
    pub event_type: String,
    pub channel: Option<String>,
    pub metadata: serde_json::Value,
    pub admin_triggered: bool,
}
