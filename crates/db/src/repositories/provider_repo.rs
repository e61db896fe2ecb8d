//! Repository for the `wedding_providers` table.

use sqlx::PgPool;
use vowline_core::types::DbId;

use crate::models::payment::{CreateProvider, Provider, UpdateProvider};

const COLUMNS: &str = "id, wedding_id, category, name, contact_email, phone, \
    total_amount_cents, notes, created_at, updated_at";

pub struct ProviderRepo;

impl ProviderRepo {
    pub async fn create(
        pool: &PgPool,
        wedding_id: DbId,
        input: &CreateProvider,
    ) -> Result<Provider, sqlx::Error> {
        let query = format!(
            "INSERT INTO wedding_providers \
                (wedding_id, category, name, contact_email, phone, total_amount_cents, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Provider>(&query)
            .bind(wedding_id)
            .bind(&input.category)
            .bind(&input.name)
            .bind(&input.contact_email)
            .bind(&input.phone)
            .bind(input.total_amount_cents)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_wedding(
        pool: &PgPool,
        wedding_id: DbId,
    ) -> Result<Vec<Provider>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM wedding_providers WHERE wedding_id = $1 ORDER BY category, name"
        );
        sqlx::query_as::<_, Provider>(&query)
            .bind(wedding_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_in_wedding(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
    ) -> Result<Option<Provider>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM wedding_providers WHERE id = $1 AND wedding_id = $2");
        sqlx::query_as::<_, Provider>(&query)
            .bind(id)
            .bind(wedding_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
        input: &UpdateProvider,
    ) -> Result<Option<Provider>, sqlx::Error> {
        let query = format!(
            "UPDATE wedding_providers SET
                category = COALESCE($3, category),
                name = COALESCE($4, name),
                contact_email = COALESCE($5, contact_email),
                phone = COALESCE($6, phone),
                total_amount_cents = COALESCE($7, total_amount_cents),
                notes = COALESCE($8, notes)
             WHERE id = $1 AND wedding_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Provider>(&query)
            .bind(id)
            .bind(wedding_id)
            .bind(&input.category)
            .bind(&input.name)
            .bind(&input.contact_email)
            .bind(&input.phone)
            .bind(input.total_amount_cents)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, wedding_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM wedding_providers WHERE id = $1 AND wedding_id = $2")
                .bind(id)
                .bind(wedding_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
