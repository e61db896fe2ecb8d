//! Handlers for the admin notification feed.
//!
//! Notifications are the notifiable subset of the wedding's tracking events,
//! with read state kept per reader email. Filtering, counting and bulk reads
//! all run in SQL over the wedding's whole history.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use vowline_core::error::CoreError;
use vowline_core::tracking::{
    notifiable_types, summarize, EventRecord, NotificationFilter, NotificationSummary,
    NotificationView, TrackingEventType, TypeCount,
};
use vowline_core::types::DbId;
use vowline_db::models::tracking::{NotificationCountRow, NotificationQuery, NotificationRow};
use vowline_db::repositories::{NotificationReadRepo, TrackingEventRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireWeddingAdmin;
use crate::query::FeedParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Rows whose type this build does not know are skipped.
fn to_views(rows: Vec<NotificationRow>) -> Vec<NotificationView> {
    rows.into_iter()
        .filter_map(|row| {
            let event = row.event;
            let event_type = TrackingEventType::from_str_db(&event.event_type).ok()?;
            Some(NotificationView {
                event: EventRecord {
                    id: event.id,
                    event_type,
                    family_id: event.family_id,
                    family_name: event.family_name,
                    channel: event.channel,
                    metadata: event.metadata,
                    created_at: event.created_at,
                },
                is_read: row.is_read,
            })
        })
        .collect()
}

fn to_counts(rows: Vec<NotificationCountRow>) -> Vec<(TrackingEventType, TypeCount)> {
    rows.into_iter()
        .filter_map(|row| {
            let event_type = TrackingEventType::from_str_db(&row.event_type).ok()?;
            Some((
                event_type,
                TypeCount {
                    total: row.total,
                    unread: row.unread,
                },
            ))
        })
        .collect()
}

/// GET /api/admin/notifications?event_type=&family_id=&unread_only=&since=&limit=
pub async fn list_notifications(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Query(feed): Query<FeedParams>,
    Query(filter): Query<NotificationFilter>,
) -> AppResult<Json<DataResponse<Vec<NotificationView>>>> {
    let event_types = filter.event_types();
    let query = NotificationQuery {
        reader_email: &access.user.email,
        event_types: &event_types,
        family_id: filter.family_id,
        unread_only: filter.unread_only,
        since: feed.since,
        limit: feed.clamped_limit(),
    };
    let rows = TrackingEventRepo::list_notifications(&state.pool, access.wedding_id, &query).await?;
    Ok(Json(DataResponse {
        data: to_views(rows),
    }))
}

/// GET /api/admin/notifications/summary?since=
pub async fn notification_summary(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Query(feed): Query<FeedParams>,
) -> AppResult<Json<DataResponse<NotificationSummary>>> {
    let rows = TrackingEventRepo::count_notifications(
        &state.pool,
        access.wedding_id,
        &access.user.email,
        &notifiable_types(),
        feed.since,
    )
    .await?;
    Ok(Json(DataResponse {
        data: summarize(to_counts(rows)),
    }))
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked: u64,
}

/// POST /api/admin/notifications/{id}/read
///
/// Idempotent; marking an already read notification reports `marked: 0`.
pub async fn mark_read(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    if !TrackingEventRepo::belongs_to_wedding(&state.pool, access.wedding_id, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }));
    }
    let inserted = NotificationReadRepo::mark_read(&state.pool, id, &access.user.email).await?;
    Ok(Json(DataResponse {
        data: MarkedRead {
            marked: u64::from(inserted),
        },
    }))
}

/// POST /api/admin/notifications/read-all
pub async fn mark_all_read(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked = NotificationReadRepo::mark_all_read(
        &state.pool,
        access.wedding_id,
        &access.user.email,
        &notifiable_types(),
    )
    .await?;

    tracing::debug!(wedding_id = access.wedding_id, marked, "Notifications marked read");
    Ok(Json(DataResponse {
        data: MarkedRead { marked },
    }))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use vowline_db::models::tracking::TrackingEventRow;

    use super::*;

    fn row(id: DbId, event_type: &str, is_read: bool) -> NotificationRow {
        NotificationRow {
            event: TrackingEventRow {
                id,
                wedding_id: 1,
                family_id: Some(7),
                family_name: Some("Rossi".into()),
                event_type: event_type.into(),
                channel: None,
                metadata: serde_json::json!({}),
                admin_triggered: false,
                created_at: Utc::now(),
            },
            is_read,
        }
    }

    #[test]
    fn unknown_event_types_are_skipped() {
        let views = to_views(vec![
            row(1, "RSVP_SUBMITTED", true),
            row(2, "SOMETHING_NEW", false),
        ]);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].event.event_type, TrackingEventType::RsvpSubmitted);
        assert_eq!(views[0].event.family_name.as_deref(), Some("Rossi"));
        assert!(views[0].is_read);
    }

    #[test]
    fn counts_of_unknown_types_are_skipped() {
        let counts = to_counts(vec![
            NotificationCountRow {
                event_type: "GUEST_ADDED".into(),
                total: 3,
                unread: 1,
            },
            NotificationCountRow {
                event_type: "SOMETHING_NEW".into(),
                total: 9,
                unread: 9,
            },
        ]);
        assert_eq!(counts, vec![(TrackingEventType::GuestAdded, TypeCount { total: 3, unread: 1 })]);
    }
}
