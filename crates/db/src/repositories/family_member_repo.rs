//! Repository for the `family_members` table.

use sqlx::PgPool;
use vowline_core::seating::SeatedMember;
use vowline_core::types::DbId;

use crate::models::family::{CreateFamilyMember, FamilyMember, UpdateFamilyMember};

pub(crate) const MEMBER_COLUMNS: &str = "id, family_id, name, member_type, age, attending, \
    dietary_restrictions, accessibility_needs, added_by_guest, table_id, created_at, updated_at";

/// `MEMBER_COLUMNS` qualified with the `m.` alias for joins.
const JOINED_COLUMNS: &str = "m.id, m.family_id, m.name, m.member_type, m.age, m.attending, \
    m.dietary_restrictions, m.accessibility_needs, m.added_by_guest, m.table_id, \
    m.created_at, m.updated_at";

pub struct FamilyMemberRepo;

impl FamilyMemberRepo {
    /// Add a member to a family that belongs to `wedding_id`.
    ///
    /// Returns `None` if the family is not part of the wedding.
    pub async fn create(
        pool: &PgPool,
        wedding_id: DbId,
        family_id: DbId,
        input: &CreateFamilyMember,
    ) -> Result<Option<FamilyMember>, sqlx::Error> {
        let query = format!(
            "INSERT INTO family_members \
                (family_id, name, member_type, age, dietary_restrictions, accessibility_needs) \
             SELECT f.id, $3, COALESCE($4, 'ADULT'), $5, $6, $7 \
             FROM families f WHERE f.id = $2 AND f.wedding_id = $1 \
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, FamilyMember>(&query)
            .bind(wedding_id)
            .bind(family_id)
            .bind(&input.name)
            .bind(&input.member_type)
            .bind(input.age)
            .bind(&input.dietary_restrictions)
            .bind(&input.accessibility_needs)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_family(
        pool: &PgPool,
        family_id: DbId,
    ) -> Result<Vec<FamilyMember>, sqlx::Error> {
        let query =
            format!("SELECT {MEMBER_COLUMNS} FROM family_members WHERE family_id = $1 ORDER BY id");
        sqlx::query_as::<_, FamilyMember>(&query)
            .bind(family_id)
            .fetch_all(pool)
            .await
    }

    /// Update a member of a family in `wedding_id`.
    pub async fn update(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
        input: &UpdateFamilyMember,
    ) -> Result<Option<FamilyMember>, sqlx::Error> {
        let query = format!(
            "UPDATE family_members m SET
                name = COALESCE($3, m.name),
                member_type = COALESCE($4, m.member_type),
                age = COALESCE($5, m.age),
                dietary_restrictions = COALESCE($6, m.dietary_restrictions),
                accessibility_needs = COALESCE($7, m.accessibility_needs)
             FROM families f
             WHERE m.id = $1 AND m.family_id = f.id AND f.wedding_id = $2
             RETURNING {JOINED_COLUMNS}"
        );
        sqlx::query_as::<_, FamilyMember>(&query)
            .bind(id)
            .bind(wedding_id)
            .bind(&input.name)
            .bind(&input.member_type)
            .bind(input.age)
            .bind(&input.dietary_restrictions)
            .bind(&input.accessibility_needs)
            .fetch_optional(pool)
            .await
    }

    /// Delete a member of a family in `wedding_id`. Returns `true` if removed.
    pub async fn delete(pool: &PgPool, wedding_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM family_members m USING families f \
             WHERE m.id = $1 AND m.family_id = f.id AND f.wedding_id = $2",
        )
        .bind(id)
        .bind(wedding_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every member of a wedding with attendance and table, for seating.
    pub async fn seating_for_wedding(
        pool: &PgPool,
        wedding_id: DbId,
    ) -> Result<Vec<SeatedMember>, sqlx::Error> {
        let rows: Vec<(DbId, Option<bool>, Option<DbId>)> = sqlx::query_as(
            "SELECT m.id, m.attending, m.table_id \
             FROM family_members m JOIN families f ON f.id = m.family_id \
             WHERE f.wedding_id = $1",
        )
        .bind(wedding_id)
        .fetch_all(pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(member_id, attending, table_id)| SeatedMember {
                member_id,
                attending,
                table_id,
            })
            .collect())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Insert a member within an existing transaction.
    pub(crate) async fn insert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        family_id: DbId,
        input: &CreateFamilyMember,
        added_by_guest: bool,
        attending: Option<bool>,
    ) -> Result<FamilyMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO family_members \
                (family_id, name, member_type, age, dietary_restrictions, accessibility_needs, \
                 added_by_guest, attending) \
             VALUES ($1, $2, COALESCE($3, 'ADULT'), $4, $5, $6, $7, $8) \
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, FamilyMember>(&query)
            .bind(family_id)
            .bind(&input.name)
            .bind(&input.member_type)
            .bind(input.age)
            .bind(&input.dietary_restrictions)
            .bind(&input.accessibility_needs)
            .bind(added_by_guest)
            .bind(attending)
            .fetch_one(&mut **tx)
            .await
    }
}
