//! Repository for the append-only `tracking_events` table.

use sqlx::PgPool;
use vowline_core::types::{DbId, Timestamp};

use crate::models::tracking::{
    NewTrackingEvent, NotificationCountRow, NotificationQuery, NotificationRow,
};

/// Read state of event `e` for the reader bound as `$2`.
const READ_JOIN: &str = "LEFT JOIN notification_reads r \
    ON r.tracking_event_id = e.id AND r.reader_email = $2";

pub struct TrackingEventRepo;

impl TrackingEventRepo {
    /// Append an event, returning its id.
    pub async fn insert(pool: &PgPool, event: &NewTrackingEvent) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO tracking_events \
                (wedding_id, family_id, event_type, channel, metadata, admin_triggered) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id",
        )
        .bind(event.wedding_id)
        .bind(event.family_id)
        .bind(&event.event_type)
        .bind(&event.channel)
        .bind(&event.metadata)
        .bind(event.admin_triggered)
        .fetch_one(pool)
        .await
    }

    /// One page of a reader's notifications, newest first.
    pub async fn list_notifications(
        pool: &PgPool,
        wedding_id: DbId,
        query: &NotificationQuery<'_>,
    ) -> Result<Vec<NotificationRow>, sqlx::Error> {
        let sql = format!(
            "SELECT e.id, e.wedding_id, e.family_id, f.name AS family_name, \
                e.event_type, e.channel, e.metadata, e.admin_triggered, e.created_at, \
                (r.id IS NOT NULL) AS is_read \
             FROM tracking_events e \
             LEFT JOIN families f ON f.id = e.family_id \
             {READ_JOIN} \
             WHERE e.wedding_id = $1 \
               AND e.event_type = ANY($3) \
               AND ($4::BIGINT IS NULL OR e.family_id = $4) \
               AND (NOT $5 OR r.id IS NULL) \
               AND ($6::TIMESTAMPTZ IS NULL OR e.created_at >= $6) \
             ORDER BY e.created_at DESC, e.id DESC \
             LIMIT $7"
        );
        sqlx::query_as::<_, NotificationRow>(&sql)
            .bind(wedding_id)
            .bind(query.reader_email)
            .bind(query.event_types)
            .bind(query.family_id)
            .bind(query.unread_only)
            .bind(query.since)
            .bind(query.limit)
            .fetch_all(pool)
            .await
    }

    /// Total and unread notification counts per event type for a reader,
    /// over every matching event of the wedding.
    pub async fn count_notifications(
        pool: &PgPool,
        wedding_id: DbId,
        reader_email: &str,
        event_types: &[&'static str],
        since: Option<Timestamp>,
    ) -> Result<Vec<NotificationCountRow>, sqlx::Error> {
        let sql = format!(
            "SELECT e.event_type, COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE r.id IS NULL) AS unread \
             FROM tracking_events e \
             {READ_JOIN} \
             WHERE e.wedding_id = $1 \
               AND e.event_type = ANY($3) \
               AND ($4::TIMESTAMPTZ IS NULL OR e.created_at >= $4) \
             GROUP BY e.event_type"
        );
        sqlx::query_as::<_, NotificationCountRow>(&sql)
            .bind(wedding_id)
            .bind(reader_email)
            .bind(event_types)
            .bind(since)
            .fetch_all(pool)
            .await
    }

    /// Whether `id` is an event of `wedding_id`.
    pub async fn belongs_to_wedding(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM tracking_events WHERE id = $1 AND wedding_id = $2)",
        )
        .bind(id)
        .bind(wedding_id)
        .fetch_one(pool)
        .await
    }
}
