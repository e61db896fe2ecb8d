//! Repository for the `wedding_planners` table.

use sqlx::PgPool;
use vowline_core::types::DbId;

use crate::models::principal::{CreatePlanner, Planner};

const COLUMNS: &str =
    "id, email, name, password_hash, enabled, logo_url, created_at, updated_at";

pub struct PlannerRepo;

impl PlannerRepo {
    /// Insert a planner. `password_hash` is computed by the caller.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        input: &CreatePlanner,
        password_hash: Option<&str>,
    ) -> Result<Planner, sqlx::Error> {
        let query = format!(
            "INSERT INTO wedding_planners (email, name, password_hash, logo_url) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Planner>(&query)
            .bind(email)
            .bind(&input.name)
            .bind(password_hash)
            .bind(&input.logo_url)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Planner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wedding_planners WHERE id = $1");
        sqlx::query_as::<_, Planner>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Planner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wedding_planners WHERE email = $1");
        sqlx::query_as::<_, Planner>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all planners, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Planner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wedding_planners ORDER BY created_at DESC");
        sqlx::query_as::<_, Planner>(&query).fetch_all(pool).await
    }

    /// Enable or disable a planner. Returns `None` if the planner does not exist.
    ///
    /// Disabling takes effect for open sessions at their next revalidation.
    pub async fn set_enabled(
        pool: &PgPool,
        id: DbId,
        enabled: bool,
    ) -> Result<Option<Planner>, sqlx::Error> {
        let query = format!(
            "UPDATE wedding_planners SET enabled = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Planner>(&query)
            .bind(id)
            .bind(enabled)
            .fetch_optional(pool)
            .await
    }

    /// Returns `(total, enabled)` planner counts.
    pub async fn counts(pool: &PgPool) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE enabled) FROM wedding_planners",
        )
        .fetch_one(pool)
        .await
    }
}
