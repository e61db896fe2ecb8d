//! Repository for the `master_admins` table.

use sqlx::PgPool;

use crate::models::principal::MasterAdmin;

const COLUMNS: &str = "id, email, name, password_hash, created_at, updated_at";

pub struct MasterAdminRepo;

impl MasterAdminRepo {
    /// Look up a master admin by (normalized) email.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<MasterAdmin>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM master_admins WHERE email = $1");
        sqlx::query_as::<_, MasterAdmin>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Insert or refresh a master admin keyed by email. Used by the seed CLI.
    pub async fn upsert(
        pool: &PgPool,
        email: &str,
        name: &str,
        password_hash: Option<&str>,
    ) -> Result<MasterAdmin, sqlx::Error> {
        let query = format!(
            "INSERT INTO master_admins (email, name, password_hash) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (email) DO UPDATE SET \
                name = EXCLUDED.name, \
                password_hash = COALESCE(EXCLUDED.password_hash, master_admins.password_hash) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MasterAdmin>(&query)
            .bind(email)
            .bind(name)
            .bind(password_hash)
            .fetch_one(pool)
            .await
    }
}
