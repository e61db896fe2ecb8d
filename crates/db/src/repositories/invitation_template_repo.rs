//! Repository for the `invitation_templates` table.

use sqlx::PgPool;
use vowline_core::types::DbId;

use crate::models::template::{
    CreateInvitationTemplate, InvitationTemplate, UpdateInvitationTemplate,
};

const COLUMNS: &str = "id, wedding_id, name, blocks, is_active, created_at, updated_at";

pub struct InvitationTemplateRepo;

impl InvitationTemplateRepo {
    pub async fn create(
        pool: &PgPool,
        wedding_id: DbId,
        input: &CreateInvitationTemplate,
    ) -> Result<InvitationTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO invitation_templates (wedding_id, name, blocks) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InvitationTemplate>(&query)
            .bind(wedding_id)
            .bind(&input.name)
            .bind(&input.blocks)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_wedding(
        pool: &PgPool,
        wedding_id: DbId,
    ) -> Result<Vec<InvitationTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invitation_templates WHERE wedding_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, InvitationTemplate>(&query)
            .bind(wedding_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_in_wedding(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
    ) -> Result<Option<InvitationTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invitation_templates WHERE id = $1 AND wedding_id = $2"
        );
        sqlx::query_as::<_, InvitationTemplate>(&query)
            .bind(id)
            .bind(wedding_id)
            .fetch_optional(pool)
            .await
    }

    /// The template guests see, if one is active.
    pub async fn find_active(
        pool: &PgPool,
        wedding_id: DbId,
    ) -> Result<Option<InvitationTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invitation_templates WHERE wedding_id = $1 AND is_active"
        );
        sqlx::query_as::<_, InvitationTemplate>(&query)
            .bind(wedding_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
        input: &UpdateInvitationTemplate,
    ) -> Result<Option<InvitationTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE invitation_templates SET
                name = COALESCE($3, name),
                blocks = COALESCE($4, blocks)
             WHERE id = $1 AND wedding_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, InvitationTemplate>(&query)
            .bind(id)
            .bind(wedding_id)
            .bind(&input.name)
            .bind(&input.blocks)
            .fetch_optional(pool)
            .await
    }

    /// Make `id` the wedding's only active template.
    ///
    /// Returns `false` if the template does not belong to the wedding.
    pub async fn activate(pool: &PgPool, wedding_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query(
            "UPDATE invitation_templates SET is_active = FALSE \
             WHERE wedding_id = $1 AND is_active AND id <> $2",
        )
        .bind(wedding_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        let result = sqlx::query(
            "UPDATE invitation_templates SET is_active = TRUE WHERE id = $1 AND wedding_id = $2",
        )
        .bind(id)
        .bind(wedding_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }
        tx.commit().await?;
        Ok(true)
    }

    pub async fn delete(pool: &PgPool, wedding_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM invitation_templates WHERE id = $1 AND wedding_id = $2")
                .bind(id)
                .bind(wedding_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
