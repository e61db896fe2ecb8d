//! Repository for `notification_reads`, the per-reader read overlay on
//! tracking events.

use sqlx::PgPool;
use vowline_core::types::DbId;

pub struct NotificationReadRepo;

impl NotificationReadRepo {
    /// Mark one event read. Returns `false` if it was already read.
    pub async fn mark_read(
        pool: &PgPool,
        tracking_event_id: DbId,
        reader_email: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO notification_reads (tracking_event_id, reader_email) \
             VALUES ($1, $2) \
             ON CONFLICT (tracking_event_id, reader_email) DO NOTHING",
        )
        .bind(tracking_event_id)
        .bind(reader_email)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every event of the wedding whose type is in `event_types` read
    /// for `reader_email`. Returns how many were newly marked.
    pub async fn mark_all_read(
        pool: &PgPool,
        wedding_id: DbId,
        reader_email: &str,
        event_types: &[&'static str],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO notification_reads (tracking_event_id, reader_email) \
             SELECT id, $2 FROM tracking_events \
             WHERE wedding_id = $1 AND event_type = ANY($3) \
             ON CONFLICT (tracking_event_id, reader_email) DO NOTHING",
        )
        .bind(wedding_id)
        .bind(reader_email)
        .bind(event_types)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
