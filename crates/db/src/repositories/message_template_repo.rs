//! Repository for the `message_templates` table.

use sqlx::PgPool;
use vowline_core::types::DbId;

use crate::models::template::{MessageTemplateRow, UpsertMessageTemplate};

const COLUMNS: &str = "id, wedding_id, template_type, language, channel, subject, body, \
    content_sid, created_at, updated_at";

pub struct MessageTemplateRepo;

impl MessageTemplateRepo {
    /// Create or replace the template in the input's slot.
    pub async fn upsert(
        pool: &PgPool,
        wedding_id: DbId,
        input: &UpsertMessageTemplate,
    ) -> Result<MessageTemplateRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO message_templates \
                (wedding_id, template_type, language, channel, subject, body, content_sid) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (wedding_id, template_type, language, channel) DO UPDATE SET \
                subject = EXCLUDED.subject, \
                body = EXCLUDED.body, \
                content_sid = EXCLUDED.content_sid \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MessageTemplateRow>(&query)
            .bind(wedding_id)
            .bind(&input.template_type)
            .bind(&input.language)
            .bind(&input.channel)
            .bind(&input.subject)
            .bind(&input.body)
            .bind(&input.content_sid)
            .fetch_one(pool)
            .await
    }

    /// List a wedding's templates, optionally of one type.
    pub async fn list_for_wedding(
        pool: &PgPool,
        wedding_id: DbId,
        template_type: Option<&str>,
    ) -> Result<Vec<MessageTemplateRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM message_templates \
             WHERE wedding_id = $1 AND ($2::TEXT IS NULL OR template_type = $2) \
             ORDER BY template_type, language, channel"
        );
        sqlx::query_as::<_, MessageTemplateRow>(&query)
            .bind(wedding_id)
            .bind(template_type)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, wedding_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM message_templates WHERE id = $1 AND wedding_id = $2")
                .bind(id)
                .bind(wedding_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
