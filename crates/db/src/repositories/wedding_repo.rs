//! Repository for the `weddings` table.

use sqlx::PgPool;
use vowline_core::types::DbId;

use crate::models::wedding::{CreateWedding, UpdateWedding, Wedding};

const COLUMNS: &str = "id, planner_id, couple_names, wedding_date, wedding_time, location, \
    venue_address, default_language, rsvp_cutoff_date, is_active, theme_id, dress_code, \
    additional_info, wizard_step, wizard_completed, created_at, updated_at";

pub struct WeddingRepo;

impl WeddingRepo {
    /// Insert a wedding owned by `planner_id`.
    pub async fn create(
        pool: &PgPool,
        planner_id: DbId,
        input: &CreateWedding,
    ) -> Result<Wedding, sqlx::Error> {
        let query = format!(
            "INSERT INTO weddings \
                (planner_id, couple_names, wedding_date, wedding_time, location, venue_address, \
                 default_language, rsvp_cutoff_date, theme_id) \
             VALUES ($1, $2, $3, COALESCE($4, ''), COALESCE($5, ''), $6, COALESCE($7, 'en'), $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Wedding>(&query)
            .bind(planner_id)
            .bind(&input.couple_names)
            .bind(input.wedding_date)
            .bind(&input.wedding_time)
            .bind(&input.location)
            .bind(&input.venue_address)
            .bind(&input.default_language)
            .bind(input.rsvp_cutoff_date)
            .bind(input.theme_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Wedding>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM weddings WHERE id = $1");
        sqlx::query_as::<_, Wedding>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a wedding only if `planner_id` owns it.
    pub async fn find_for_planner(
        pool: &PgPool,
        id: DbId,
        planner_id: DbId,
    ) -> Result<Option<Wedding>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM weddings WHERE id = $1 AND planner_id = $2");
        sqlx::query_as::<_, Wedding>(&query)
            .bind(id)
            .bind(planner_id)
            .fetch_optional(pool)
            .await
    }

    /// List a planner's weddings, soonest first.
    pub async fn list_for_planner(
        pool: &PgPool,
        planner_id: DbId,
    ) -> Result<Vec<Wedding>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM weddings WHERE planner_id = $1 ORDER BY wedding_date, id"
        );
        sqlx::query_as::<_, Wedding>(&query)
            .bind(planner_id)
            .fetch_all(pool)
            .await
    }

    /// Update a wedding. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWedding,
    ) -> Result<Option<Wedding>, sqlx::Error> {
        let query = format!(
            "UPDATE weddings SET
                couple_names = COALESCE($2, couple_names),
                wedding_date = COALESCE($3, wedding_date),
                wedding_time = COALESCE($4, wedding_time),
                location = COALESCE($5, location),
                venue_address = COALESCE($6, venue_address),
                default_language = COALESCE($7, default_language),
                rsvp_cutoff_date = COALESCE($8, rsvp_cutoff_date),
                theme_id = COALESCE($9, theme_id),
                dress_code = COALESCE($10, dress_code),
                additional_info = COALESCE($11, additional_info),
                wizard_step = COALESCE($12, wizard_step),
                wizard_completed = COALESCE($13, wizard_completed),
                is_active = COALESCE($14, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Wedding>(&query)
            .bind(id)
            .bind(&input.couple_names)
            .bind(input.wedding_date)
            .bind(&input.wedding_time)
            .bind(&input.location)
            .bind(&input.venue_address)
            .bind(&input.default_language)
            .bind(input.rsvp_cutoff_date)
            .bind(input.theme_id)
            .bind(&input.dress_code)
            .bind(&input.additional_info)
            .bind(input.wizard_step)
            .bind(input.wizard_completed)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Returns `(total, active)` wedding counts across all planners.
    pub async fn counts(pool: &PgPool) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as("SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM weddings")
            .fetch_one(pool)
            .await
    }
}
