//! Repository for the `wedding_admins` table.

use sqlx::PgPool;
use vowline_core::types::DbId;

use crate::models::principal::{CreateWeddingAdmin, WeddingAdmin};

const COLUMNS: &str =
    "id, wedding_id, email, name, password_hash, last_login_at, created_at, updated_at";

pub struct WeddingAdminRepo;

impl WeddingAdminRepo {
    pub async fn create(
        pool: &PgPool,
        wedding_id: DbId,
        email: &str,
        input: &CreateWeddingAdmin,
        password_hash: Option<&str>,
    ) -> Result<WeddingAdmin, sqlx::Error> {
        let query = format!(
            "INSERT INTO wedding_admins (wedding_id, email, name, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WeddingAdmin>(&query)
            .bind(wedding_id)
            .bind(email)
            .bind(&input.name)
            .bind(password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find the admin record for an email on an active wedding.
    ///
    /// With `wedding_id` the lookup is limited to that wedding. Without it an
    /// email administering several weddings resolves to the most recently
    /// created one.
    pub async fn find_active_by_email(
        pool: &PgPool,
        email: &str,
        wedding_id: Option<DbId>,
    ) -> Result<Option<WeddingAdmin>, sqlx::Error> {
        let query = format!(
            "SELECT {cols} FROM wedding_admins wa \
             WHERE wa.email = $1 \
               AND ($2::BIGINT IS NULL OR wa.wedding_id = $2) \
               AND EXISTS (SELECT 1 FROM weddings w WHERE w.id = wa.wedding_id AND w.is_active) \
             ORDER BY wa.created_at DESC \
             LIMIT 1",
            cols = prefixed("wa")
        );
        sqlx::query_as::<_, WeddingAdmin>(&query)
            .bind(email)
            .bind(wedding_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_wedding(
        pool: &PgPool,
        wedding_id: DbId,
    ) -> Result<Vec<WeddingAdmin>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM wedding_admins WHERE wedding_id = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, WeddingAdmin>(&query)
            .bind(wedding_id)
            .fetch_all(pool)
            .await
    }

    pub async fn touch_last_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE wedding_admins SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

fn prefixed(alias: &str) -> String {
    COLUMNS
        .split(", ")
        .map(|c| format!("{alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}
