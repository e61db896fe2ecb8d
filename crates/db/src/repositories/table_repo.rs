//! Repository for the `tables` table and seat assignment.

use sqlx::PgPool;
use vowline_core::error::CoreError;
use vowline_core::seating::{validate_assignments, SeatAssignment, TableCapacity};
use vowline_core::types::DbId;

use crate::models::table::{CreateTable, SeatingTable, UpdateTable};
use crate::repositories::GuardedWriteError;

const COLUMNS: &str = "id, wedding_id, name, capacity, number, created_at, updated_at";

pub struct TableRepo;

impl TableRepo {
    pub async fn create(
        pool: &PgPool,
        wedding_id: DbId,
        input: &CreateTable,
    ) -> Result<SeatingTable, sqlx::Error> {
        let query = format!(
            "INSERT INTO tables (wedding_id, name, capacity, number) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SeatingTable>(&query)
            .bind(wedding_id)
            .bind(&input.name)
            .bind(input.capacity)
            .bind(input.number)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_wedding(
        pool: &PgPool,
        wedding_id: DbId,
    ) -> Result<Vec<SeatingTable>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tables WHERE wedding_id = $1 \
             ORDER BY number NULLS LAST, name, id"
        );
        sqlx::query_as::<_, SeatingTable>(&query)
            .bind(wedding_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_in_wedding(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
    ) -> Result<Option<SeatingTable>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tables WHERE id = $1 AND wedding_id = $2");
        sqlx::query_as::<_, SeatingTable>(&query)
            .bind(id)
            .bind(wedding_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a table. Only non-`None` fields in `input` are applied.
    ///
    /// The table row is locked while its seated guests are recounted, so a
    /// concurrent seat assignment cannot slip in under a shrinking capacity.
    /// Returns `Ok(None)` when the table is not in the wedding.
    pub async fn update(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
        input: &UpdateTable,
    ) -> Result<Option<SeatingTable>, GuardedWriteError> {
        let mut tx = pool.begin().await?;

        let locked: Option<(String, i32)> = sqlx::query_as(
            "SELECT name, capacity FROM tables WHERE id = $1 AND wedding_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(wedding_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((name, current_capacity)) = locked else {
            return Ok(None);
        };

        if let Some(capacity) = input.capacity.filter(|c| *c < current_capacity) {
            let seated: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM family_members WHERE table_id = $1")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
            if seated > i64::from(capacity) {
                return Err(CoreError::Validation(format!(
                    "Table '{name}' already seats {seated} guests"
                ))
                .into());
            }
        }

        let query = format!(
            "UPDATE tables SET
                name = COALESCE($3, name),
                capacity = COALESCE($4, capacity),
                number = COALESCE($5, number)
             WHERE id = $1 AND wedding_id = $2
             RETURNING {COLUMNS}"
        );
        let table = sqlx::query_as::<_, SeatingTable>(&query)
            .bind(id)
            .bind(wedding_id)
            .bind(&input.name)
            .bind(input.capacity)
            .bind(input.number)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(table))
    }

    /// Delete a table; its guests become unseated. Returns `true` if removed.
    pub async fn delete(pool: &PgPool, wedding_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tables WHERE id = $1 AND wedding_id = $2")
            .bind(id)
            .bind(wedding_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of members currently seated at a table.
    pub async fn occupancy(pool: &PgPool, table_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM family_members WHERE table_id = $1")
            .bind(table_id)
            .fetch_one(pool)
            .await
    }

    pub async fn capacities(
        pool: &PgPool,
        wedding_id: DbId,
    ) -> Result<Vec<TableCapacity>, sqlx::Error> {
        let rows: Vec<(DbId, i32)> =
            sqlx::query_as("SELECT id, capacity FROM tables WHERE wedding_id = $1 ORDER BY id")
                .bind(wedding_id)
                .fetch_all(pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(table_id, capacity)| TableCapacity { table_id, capacity })
            .collect())
    }

    /// Apply a batch of seat changes atomically.
    ///
    /// The wedding's tables are locked for the duration so that two
    /// concurrent batches cannot both pass the capacity check. Members outside
    /// the wedding are rejected.
    pub async fn assign_seats(
        pool: &PgPool,
        wedding_id: DbId,
        changes: &[SeatAssignment],
    ) -> Result<(), GuardedWriteError> {
        let mut tx = pool.begin().await?;

        let tables: Vec<(DbId, i32)> = sqlx::query_as(
            "SELECT id, capacity FROM tables WHERE wedding_id = $1 ORDER BY id FOR UPDATE",
        )
        .bind(wedding_id)
        .fetch_all(&mut *tx)
        .await?;
        let tables: Vec<TableCapacity> = tables
            .into_iter()
            .map(|(table_id, capacity)| TableCapacity { table_id, capacity })
            .collect();

        let current: Vec<(DbId, Option<DbId>)> = sqlx::query_as(
            "SELECT m.id, m.table_id \
             FROM family_members m JOIN families f ON f.id = m.family_id \
             WHERE f.wedding_id = $1",
        )
        .bind(wedding_id)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(stranger) = changes
            .iter()
            .find(|c| !current.iter().any(|(id, _)| *id == c.member_id))
        {
            return Err(CoreError::NotFound {
                entity: "FamilyMember",
                id: stranger.member_id,
            }
            .into());
        }

        let current: Vec<SeatAssignment> = current
            .into_iter()
            .map(|(member_id, table_id)| SeatAssignment { member_id, table_id })
            .collect();
        validate_assignments(&tables, &current, changes)?;

        for change in changes {
            sqlx::query("UPDATE family_members SET table_id = $2 WHERE id = $1")
                .bind(change.member_id)
                .bind(change.table_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::debug!(wedding_id, changes = changes.len(), "Seat assignments applied");
        Ok(())
    }
}
