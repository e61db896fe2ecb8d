//! Repository for the `families` table.
//!
//! Families are always addressed through their wedding, except for the
//! magic-token lookup which is how guests find their own family.

use std::collections::HashMap;

use sqlx::PgPool;
use vowline_core::guest_csv::FamilyRecord;
use vowline_core::magic_link::generate_magic_token;
use vowline_core::error::CoreError;
use vowline_core::rsvp::{RsvpSubmission, MAX_GUEST_ADDED_MEMBERS};
use vowline_core::types::{DbId, Timestamp};

use crate::models::family::{
    CreateFamily, CreateFamilyMember, Family, FamilyMember, FamilyWithMembers, UpdateFamily,
};
use crate::models::wedding::WeddingGuestCounts;
use crate::repositories::family_member_repo::{FamilyMemberRepo, MEMBER_COLUMNS};
use crate::repositories::GuardedWriteError;

const COLUMNS: &str = "id, wedding_id, name, email, phone, whatsapp_number, magic_token, \
    preferred_language, channel_preference, invited_by_admin_id, rsvp_submitted_at, \
    created_at, updated_at";

/// Outcome of an RSVP write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsvpWrite {
    /// `true` when this was the family's first response.
    pub first_response: bool,
    pub members_added: usize,
}

pub struct FamilyRepo;

impl FamilyRepo {
    /// Insert a family and its initial members in one transaction.
    pub async fn create(
        pool: &PgPool,
        wedding_id: DbId,
        input: &CreateFamily,
        magic_token: &str,
        invited_by_admin_id: Option<DbId>,
    ) -> Result<FamilyWithMembers, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO families \
                (wedding_id, name, email, phone, whatsapp_number, magic_token, \
                 preferred_language, channel_preference, invited_by_admin_id) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'en'), $8, $9) \
             RETURNING {COLUMNS}"
        );
        let family = sqlx::query_as::<_, Family>(&query)
            .bind(wedding_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.whatsapp_number)
            .bind(magic_token)
            .bind(&input.preferred_language)
            .bind(&input.channel_preference)
            .bind(invited_by_admin_id)
            .fetch_one(&mut *tx)
            .await?;

        let mut members = Vec::with_capacity(input.members.len());
        for member in &input.members {
            let member = FamilyMemberRepo::insert_inner(&mut tx, family.id, member, false, None).await?;
            members.push(member);
        }

        tx.commit().await?;
        Ok(FamilyWithMembers { family, members })
    }

    /// Find a family by its magic token.
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Family>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM families WHERE magic_token = $1");
        sqlx::query_as::<_, Family>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Find a family scoped to its wedding.
    pub async fn find_in_wedding(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
    ) -> Result<Option<Family>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM families WHERE id = $1 AND wedding_id = $2");
        sqlx::query_as::<_, Family>(&query)
            .bind(id)
            .bind(wedding_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_with_members(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
    ) -> Result<Option<FamilyWithMembers>, sqlx::Error> {
        let Some(family) = Self::find_in_wedding(pool, wedding_id, id).await? else {
            return Ok(None);
        };
        let members = FamilyMemberRepo::list_for_family(pool, family.id).await?;
        Ok(Some(FamilyWithMembers { family, members }))
    }

    /// List a wedding's families ordered by name.
    pub async fn list_for_wedding(
        pool: &PgPool,
        wedding_id: DbId,
    ) -> Result<Vec<Family>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM families WHERE wedding_id = $1 ORDER BY name, id");
        sqlx::query_as::<_, Family>(&query)
            .bind(wedding_id)
            .fetch_all(pool)
            .await
    }

    /// List a wedding's families with their members, in two queries.
    pub async fn list_with_members(
        pool: &PgPool,
        wedding_id: DbId,
    ) -> Result<Vec<FamilyWithMembers>, sqlx::Error> {
        let families = Self::list_for_wedding(pool, wedding_id).await?;
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM family_members \
             WHERE family_id IN (SELECT id FROM families WHERE wedding_id = $1) \
             ORDER BY family_id, id"
        );
        let members = sqlx::query_as::<_, FamilyMember>(&query)
            .bind(wedding_id)
            .fetch_all(pool)
            .await?;

        let mut by_family: HashMap<DbId, Vec<FamilyMember>> = HashMap::new();
        for member in members {
            by_family.entry(member.family_id).or_default().push(member);
        }
        Ok(families
            .into_iter()
            .map(|family| {
                let members = by_family.remove(&family.id).unwrap_or_default();
                FamilyWithMembers { family, members }
            })
            .collect())
    }

    /// Families that have not responded yet.
    pub async fn list_pending(pool: &PgPool, wedding_id: DbId) -> Result<Vec<Family>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM families \
             WHERE wedding_id = $1 AND rsvp_submitted_at IS NULL \
             ORDER BY id"
        );
        sqlx::query_as::<_, Family>(&query)
            .bind(wedding_id)
            .fetch_all(pool)
            .await
    }

    /// Update a family. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        wedding_id: DbId,
        id: DbId,
        input: &UpdateFamily,
    ) -> Result<Option<Family>, sqlx::Error> {
        let query = format!(
            "UPDATE families SET
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                whatsapp_number = COALESCE($6, whatsapp_number),
                preferred_language = COALESCE($7, preferred_language),
                channel_preference = COALESCE($8, channel_preference)
             WHERE id = $1 AND wedding_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Family>(&query)
            .bind(id)
            .bind(wedding_id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.whatsapp_number)
            .bind(&input.preferred_language)
            .bind(&input.channel_preference)
            .fetch_optional(pool)
            .await
    }

    /// Delete a family and (by cascade) its members. Returns `true` if removed.
    pub async fn delete(pool: &PgPool, wedding_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM families WHERE id = $1 AND wedding_id = $2")
            .bind(id)
            .bind(wedding_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a validated RSVP in one transaction.
    ///
    /// Member answers only touch members of `family_id`; guest-added members
    /// are inserted with `added_by_guest = true`. The family row is locked
    /// while the guest-added total is checked against
    /// [`MAX_GUEST_ADDED_MEMBERS`] across all of the family's submissions.
    pub async fn submit_rsvp(
        pool: &PgPool,
        family_id: DbId,
        submission: &RsvpSubmission,
        preferred_language: Option<&str>,
    ) -> Result<RsvpWrite, GuardedWriteError> {
        let mut tx = pool.begin().await?;

        let previous: Option<Option<Timestamp>> = sqlx::query_scalar(
            "SELECT rsvp_submitted_at FROM families WHERE id = $1 FOR UPDATE",
        )
        .bind(family_id)
        .fetch_optional(&mut *tx)
        .await?;

        if !submission.new_members.is_empty() {
            let already_added: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM family_members WHERE family_id = $1 AND added_by_guest",
            )
            .bind(family_id)
            .fetch_one(&mut *tx)
            .await?;
            let total = usize::try_from(already_added)
                .unwrap_or(usize::MAX)
                .saturating_add(submission.new_members.len());
            if total > MAX_GUEST_ADDED_MEMBERS {
                return Err(CoreError::Validation(format!(
                    "At most {MAX_GUEST_ADDED_MEMBERS} members can be added \
                     ({already_added} already added)"
                ))
                .into());
            }
        }

        for answer in &submission.members {
            sqlx::query(
                "UPDATE family_members SET \
                    attending = $3, \
                    dietary_restrictions = $4, \
                    accessibility_needs = $5 \
                 WHERE id = $1 AND family_id = $2",
            )
            .bind(answer.member_id)
            .bind(family_id)
            .bind(answer.attending)
            .bind(&answer.dietary_restrictions)
            .bind(&answer.accessibility_needs)
            .execute(&mut *tx)
            .await?;
        }

        for new_member in &submission.new_members {
            let input = CreateFamilyMember {
                name: new_member.name.trim().to_string(),
                member_type: Some(new_member.member_type.as_str().to_string()),
                age: new_member.age,
                dietary_restrictions: new_member.dietary_restrictions.clone(),
                accessibility_needs: None,
            };
            let attending = Some(new_member.attending);
            FamilyMemberRepo::insert_inner(&mut tx, family_id, &input, true, attending).await?;
        }

        sqlx::query(
            "UPDATE families SET \
                rsvp_submitted_at = NOW(), \
                preferred_language = COALESCE($2, preferred_language) \
             WHERE id = $1",
        )
        .bind(family_id)
        .bind(preferred_language)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(RsvpWrite {
            first_response: matches!(previous, Some(None)),
            members_added: submission.new_members.len(),
        })
    }

    /// Insert parsed CSV families with fresh magic tokens, all or nothing.
    ///
    /// Returns the number of families created.
    pub async fn import_records(
        pool: &PgPool,
        wedding_id: DbId,
        records: &[FamilyRecord],
        invited_by_admin_id: Option<DbId>,
    ) -> Result<usize, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert = format!(
            "INSERT INTO families \
                (wedding_id, name, email, phone, whatsapp_number, magic_token, \
                 preferred_language, channel_preference, invited_by_admin_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        for record in records {
            let family = sqlx::query_as::<_, Family>(&insert)
                .bind(wedding_id)
                .bind(&record.name)
                .bind(&record.email)
                .bind(&record.phone)
                .bind(&record.whatsapp)
                .bind(generate_magic_token())
                .bind(record.language.as_str())
                .bind(record.channel.map(|c| c.as_str()))
                .bind(invited_by_admin_id)
                .fetch_one(&mut *tx)
                .await?;

            for member in &record.members {
                let input = CreateFamilyMember {
                    name: member.name.clone(),
                    member_type: Some(member.member_type.as_str().to_string()),
                    age: member.age,
                    dietary_restrictions: member.dietary_restrictions.clone(),
                    accessibility_needs: None,
                };
                FamilyMemberRepo::insert_inner(&mut tx, family.id, &input, false, None).await?;
            }
        }

        tx.commit().await?;
        Ok(records.len())
    }

    /// Per-wedding guest counts for a planner's weddings.
    pub async fn guest_counts_for_planner(
        pool: &PgPool,
        planner_id: DbId,
    ) -> Result<Vec<WeddingGuestCounts>, sqlx::Error> {
        sqlx::query_as::<_, WeddingGuestCounts>(
            "SELECT w.id AS wedding_id, w.couple_names, w.wedding_date, \
                (SELECT COUNT(*) FROM families f WHERE f.wedding_id = w.id) AS families, \
                (SELECT COUNT(*) FROM families f \
                  WHERE f.wedding_id = w.id AND f.rsvp_submitted_at IS NOT NULL) AS families_responded, \
                (SELECT COUNT(*) FROM family_members m JOIN families f ON f.id = m.family_id \
                  WHERE f.wedding_id = w.id) AS members, \
                (SELECT COUNT(*) FROM family_members m JOIN families f ON f.id = m.family_id \
                  WHERE f.wedding_id = w.id AND m.attending) AS members_attending \
             FROM weddings w \
             WHERE w.planner_id = $1 \
             ORDER BY w.wedding_date, w.id",
        )
        .bind(planner_id)
        .fetch_all(pool)
        .await
    }

    /// Total families across the platform.
    pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM families")
            .fetch_one(pool)
            .await
    }
}
