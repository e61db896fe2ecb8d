//! Repository for the `short_urls` table.

use sqlx::PgPool;
use vowline_core::short_url::{generate_code, MAX_GENERATION_ATTEMPTS};
use vowline_core::types::DbId;

use crate::models::short_url::ShortUrl;

const COLUMNS: &str = "id, code, family_id, created_at";

pub struct ShortUrlRepo;

impl ShortUrlRepo {
    /// Return the family's short link, creating one if needed.
    ///
    /// Code collisions are retried with a fresh code. Returns `None` only if
    /// every attempt collided.
    pub async fn get_or_create(
        pool: &PgPool,
        family_id: DbId,
    ) -> Result<Option<ShortUrl>, sqlx::Error> {
        let existing = format!("SELECT {COLUMNS} FROM short_urls WHERE family_id = $1");
        if let Some(found) = sqlx::query_as::<_, ShortUrl>(&existing)
            .bind(family_id)
            .fetch_optional(pool)
            .await?
        {
            return Ok(Some(found));
        }

        let insert = format!(
            "INSERT INTO short_urls (code, family_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING \
             RETURNING {COLUMNS}"
        );
        for _ in 0..MAX_GENERATION_ATTEMPTS {
            let created = sqlx::query_as::<_, ShortUrl>(&insert)
                .bind(generate_code())
                .bind(family_id)
                .fetch_optional(pool)
                .await?;
            if created.is_some() {
                return Ok(created);
            }
            // A concurrent request may have created the family's link.
            if let Some(found) = sqlx::query_as::<_, ShortUrl>(&existing)
                .bind(family_id)
                .fetch_optional(pool)
                .await?
            {
                return Ok(Some(found));
            }
        }
        tracing::warn!(family_id, "Short URL generation exhausted all attempts");
        Ok(None)
    }

    /// Resolve a code to the family's magic token.
    pub async fn resolve_token(pool: &PgPool, code: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT f.magic_token FROM short_urls s JOIN families f ON f.id = s.family_id \
             WHERE s.code = $1",
        )
        .bind(code)
        .fetch_optional(pool)
        .await
    }
}
