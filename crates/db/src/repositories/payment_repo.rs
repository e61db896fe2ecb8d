//! Repository for the `payments` table.

use sqlx::PgPool;
use vowline_core::types::DbId;

use crate::models::payment::{CreatePayment, Payment};

const COLUMNS: &str =
    "id, wedding_id, provider_id, amount_cents, paid_at, due_date, method, notes, created_at";

pub struct PaymentRepo;

impl PaymentRepo {
    /// Record a payment against a provider of `wedding_id`.
    ///
    /// Returns `None` if the provider is not part of the wedding.
    pub async fn create(
        pool: &PgPool,
        wedding_id: DbId,
        provider_id: DbId,
        input: &CreatePayment,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments \
                (wedding_id, provider_id, amount_cents, paid_at, due_date, method, notes) \
             SELECT p.wedding_id, p.id, $3, $4, $5, $6, $7 \
             FROM wedding_providers p WHERE p.id = $2 AND p.wedding_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(wedding_id)
            .bind(provider_id)
            .bind(input.amount_cents)
            .bind(input.paid_at)
            .bind(input.due_date)
            .bind(&input.method)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_wedding(
        pool: &PgPool,
        wedding_id: DbId,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM payments WHERE wedding_id = $1 \
             ORDER BY COALESCE(paid_at, due_date, created_at) DESC, id DESC"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(wedding_id)
            .fetch_all(pool)
            .await
    }

    /// Mark a scheduled payment as paid now. Returns `None` if not found.
    pub async fn mark_paid(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET paid_at = COALESCE(paid_at, NOW()) \
             WHERE id = $1 AND wedding_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(wedding_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, wedding_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1 AND wedding_id = $2")
            .bind(id)
            .bind(wedding_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
