//! Repository for the `themes` table.

use sqlx::PgPool;
use vowline_core::theme::ThemeDefinition;
use vowline_core::types::DbId;

use crate::models::theme::Theme;

const COLUMNS: &str = "id, key, name, is_system, config, planner_id, created_at, updated_at";

pub struct ThemeRepo;

impl ThemeRepo {
    /// Upsert the system themes keyed on `key`. Returns the number written.
    ///
    /// Rows whose content already matches are left untouched, so repeated
    /// seeding does not bump `updated_at`.
    pub async fn seed_system(
        pool: &PgPool,
        themes: &[ThemeDefinition],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut written = 0;
        for theme in themes {
            let result = sqlx::query(
                "INSERT INTO themes (key, name, is_system, config) \
                 VALUES ($1, $2, TRUE, $3) \
                 ON CONFLICT (key) DO UPDATE SET \
                    name = EXCLUDED.name, \
                    is_system = TRUE, \
                    config = EXCLUDED.config \
                 WHERE themes.name IS DISTINCT FROM EXCLUDED.name \
                    OR themes.config IS DISTINCT FROM EXCLUDED.config \
                    OR NOT themes.is_system",
            )
            .bind(theme.key)
            .bind(theme.name)
            .bind(&theme.config)
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }
        tx.commit().await?;
        Ok(written)
    }

    /// System themes plus those owned by `planner_id`, if given.
    pub async fn list_available(
        pool: &PgPool,
        planner_id: Option<DbId>,
    ) -> Result<Vec<Theme>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM themes \
             WHERE is_system OR planner_id = $1 \
             ORDER BY is_system DESC, id"
        );
        sqlx::query_as::<_, Theme>(&query)
            .bind(planner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Theme>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM themes WHERE id = $1");
        sqlx::query_as::<_, Theme>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Theme>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM themes ORDER BY id");
        sqlx::query_as::<_, Theme>(&query).fetch_all(pool).await
    }
}
