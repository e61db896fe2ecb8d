//! Handlers for the guest list: families, members, links and CSV
//! export/import.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use vowline_core::channels::Channel;
use vowline_core::error::CoreError;
use vowline_core::guest_csv::{export_guests, parse_guests, FamilyRecord, MemberRecord};
use vowline_core::i18n::Language;
use vowline_core::magic_link::{generate_magic_token, rsvp_link};
use vowline_core::roles::Role;
use vowline_core::rsvp::MemberType;
use vowline_core::types::DbId;
use vowline_db::models::family::{
    CreateFamily, CreateFamilyMember, FamilyWithMembers, UpdateFamily, UpdateFamilyMember,
};
use vowline_db::repositories::{FamilyMemberRepo, FamilyRepo, ShortUrlRepo, WeddingAdminRepo};
use vowline_db::DbPool;

use super::{
    clean_edit, clean_text, normalize_channel, normalize_language, normalize_member_type,
    require_name,
};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireWeddingAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn family_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Family",
        id,
    })
}

fn member_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "FamilyMember",
        id,
    })
}

/// The wedding-admin row behind the session, for `invited_by_admin_id`.
async fn acting_admin_id(pool: &DbPool, access: &RequireWeddingAdmin) -> AppResult<Option<DbId>> {
    if access.user.role != Role::WeddingAdmin {
        return Ok(None);
    }
    let admins = WeddingAdminRepo::list_for_wedding(pool, access.wedding_id).await?;
    Ok(admins
        .into_iter()
        .find(|a| a.email == access.user.email)
        .map(|a| a.id))
}

fn normalize_member(mut member: CreateFamilyMember) -> AppResult<CreateFamilyMember> {
    require_name(&member.name, "Member")?;
    member.name = member.name.trim().to_string();
    member.member_type = normalize_member_type(member.member_type.take())?;
    member.dietary_restrictions = clean_text(member.dietary_restrictions.take());
    member.accessibility_needs = clean_text(member.accessibility_needs.take());
    Ok(member)
}

/// Convert stored families to CSV records. Unknown stored values fall back to
/// defaults rather than failing the export.
pub(crate) fn to_records(families: &[FamilyWithMembers]) -> Vec<FamilyRecord> {
    families
        .iter()
        .map(|f| FamilyRecord {
            name: f.family.name.clone(),
            email: f.family.email.clone(),
            phone: f.family.phone.clone(),
            whatsapp: f.family.whatsapp_number.clone(),
            language: Language::parse_or_default(Some(&f.family.preferred_language)),
            channel: f
                .family
                .channel_preference
                .as_deref()
                .and_then(|c| Channel::from_str_db(c).ok()),
            members: f
                .members
                .iter()
                .map(|m| MemberRecord {
                    name: m.name.clone(),
                    member_type: MemberType::from_str_db(&m.member_type)
                        .unwrap_or(MemberType::Adult),
                    age: m.age,
                    dietary_restrictions: m.dietary_restrictions.clone(),
                })
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Families
// ---------------------------------------------------------------------------

/// GET /api/admin/guests
pub async fn list_families(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let families = FamilyRepo::list_with_members(&state.pool, access.wedding_id).await?;
    Ok(Json(DataResponse { data: families }))
}

/// POST /api/admin/guests
///
/// Create a family with its initial members and a fresh magic token.
pub async fn create_family(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateFamily>,
) -> AppResult<impl IntoResponse> {
    require_name(&input.name, "Family")?;
    input.name = input.name.trim().to_string();
    input.email = clean_text(input.email.take());
    input.phone = clean_text(input.phone.take());
    input.whatsapp_number = clean_text(input.whatsapp_number.take());
    input.preferred_language = normalize_language(input.preferred_language.take())?;
    input.channel_preference = normalize_channel(input.channel_preference.take())?;
    input.members = input
        .members
        .into_iter()
        .map(normalize_member)
        .collect::<AppResult<_>>()?;

    let invited_by = acting_admin_id(&state.pool, &access).await?;
    let family = FamilyRepo::create(
        &state.pool,
        access.wedding_id,
        &input,
        &generate_magic_token(),
        invited_by,
    )
    .await?;

    tracing::info!(
        wedding_id = access.wedding_id,
        family_id = family.family.id,
        members = family.members.len(),
        "Family created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: family })))
}

/// GET /api/admin/guests/{id}
pub async fn get_family(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let family = FamilyRepo::find_with_members(&state.pool, access.wedding_id, id)
        .await?
        .ok_or_else(|| family_not_found(id))?;
    Ok(Json(DataResponse { data: family }))
}

/// PUT /api/admin/guests/{id}
pub async fn update_family(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateFamily>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        require_name(name, "Family")?;
    }
    input.name = clean_edit(input.name.take());
    input.email = clean_edit(input.email.take());
    input.phone = clean_edit(input.phone.take());
    input.whatsapp_number = clean_edit(input.whatsapp_number.take());
    input.preferred_language = normalize_language(input.preferred_language.take())?;
    input.channel_preference = normalize_channel(input.channel_preference.take())?;

    let family = FamilyRepo::update(&state.pool, access.wedding_id, id, &input)
        .await?
        .ok_or_else(|| family_not_found(id))?;
    Ok(Json(DataResponse { data: family }))
}

/// DELETE /api/admin/guests/{id}
pub async fn delete_family(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !FamilyRepo::delete(&state.pool, access.wedding_id, id).await? {
        return Err(family_not_found(id));
    }
    tracing::info!(wedding_id = access.wedding_id, family_id = id, "Family deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct FamilyLinks {
    pub rsvp_url: String,
    pub short_url: Option<String>,
}

/// GET /api/admin/guests/{id}/link
///
/// The family's RSVP link and, when one can be issued, its short form.
pub async fn family_link(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let family = FamilyRepo::find_in_wedding(&state.pool, access.wedding_id, id)
        .await?
        .ok_or_else(|| family_not_found(id))?;
    let base = &state.config.public_base_url;
    let short = ShortUrlRepo::get_or_create(&state.pool, family.id).await?;
    Ok(Json(DataResponse {
        data: FamilyLinks {
            rsvp_url: rsvp_link(base, &family.magic_token),
            short_url: short.map(|s| format!("{base}/s/{}", s.code)),
        },
    }))
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// POST /api/admin/guests/{id}/members
pub async fn add_member(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(family_id): Path<DbId>,
    Json(input): Json<CreateFamilyMember>,
) -> AppResult<impl IntoResponse> {
    let input = normalize_member(input)?;
    let member = FamilyMemberRepo::create(&state.pool, access.wedding_id, family_id, &input)
        .await?
        .ok_or_else(|| family_not_found(family_id))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// PUT /api/admin/members/{id}
pub async fn update_member(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdateFamilyMember>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        require_name(name, "Member")?;
    }
    input.name = clean_edit(input.name.take());
    input.dietary_restrictions = clean_edit(input.dietary_restrictions.take());
    input.accessibility_needs = clean_edit(input.accessibility_needs.take());
    input.member_type = normalize_member_type(input.member_type.take())?;
    let member = FamilyMemberRepo::update(&state.pool, access.wedding_id, id, &input)
        .await?
        .ok_or_else(|| member_not_found(id))?;
    Ok(Json(DataResponse { data: member }))
}

/// DELETE /api/admin/members/{id}
pub async fn delete_member(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !FamilyMemberRepo::delete(&state.pool, access.wedding_id, id).await? {
        return Err(member_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// GET /api/admin/guests/export
///
/// The guest list as CSV, one row per member.
pub async fn export_csv(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let families = FamilyRepo::list_with_members(&state.pool, access.wedding_id).await?;
    let csv = export_guests(&to_records(&families));
    let disposition = format!(
        "attachment; filename=\"guests-{}.csv\"",
        access.wedding_id
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
    pub imported: usize,
}

/// POST /api/admin/guests/import
///
/// Body is CSV text in the export format. All rows are imported or none.
pub async fn import_csv(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    body: String,
) -> AppResult<impl IntoResponse> {
    let records = parse_guests(&body)?;
    let invited_by = acting_admin_id(&state.pool, &access).await?;
    let imported =
        FamilyRepo::import_records(&state.pool, access.wedding_id, &records, invited_by).await?;

    tracing::info!(wedding_id = access.wedding_id, imported, "Guest list imported");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ImportResult { imported },
        }),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use vowline_db::models::family::{Family, FamilyMember};

    use super::*;

    #[test]
    fn members_are_stored_trimmed() {
        let member = normalize_member(CreateFamilyMember {
            name: " Ann ".into(),
            member_type: Some("child".into()),
            age: Some(4),
            dietary_restrictions: Some("  ".into()),
            accessibility_needs: Some(" ramp ".into()),
        })
        .unwrap();
        assert_eq!(member.name, "Ann");
        assert_eq!(member.member_type.as_deref(), Some("CHILD"));
        assert_eq!(member.dietary_restrictions, None);
        assert_eq!(member.accessibility_needs.as_deref(), Some("ramp"));
    }

    #[test]
    fn stored_families_convert_to_records() {
        let now = Utc::now();
        let family = FamilyWithMembers {
            family: Family {
                id: 1,
                wedding_id: 2,
                name: "García".into(),
                email: Some("g@example.com".into()),
                phone: None,
                whatsapp_number: None,
                magic_token: "tok".into(),
                preferred_language: "es".into(),
                channel_preference: Some("EMAIL".into()),
                invited_by_admin_id: None,
                rsvp_submitted_at: None,
                created_at: now,
                updated_at: now,
            },
            members: vec![FamilyMember {
                id: 3,
                family_id: 1,
                name: "Lucía".into(),
                member_type: "CHILD".into(),
                age: Some(7),
                attending: None,
                dietary_restrictions: None,
                accessibility_needs: None,
                added_by_guest: false,
                table_id: None,
                created_at: now,
                updated_at: now,
            }],
        };

        let records = to_records(&[family]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].language, Language::Es);
        assert_eq!(records[0].channel, Some(Channel::Email));
        assert_eq!(records[0].members[0].member_type, MemberType::Child);

        let reparsed = parse_guests(&export_guests(&records)).unwrap();
        assert_eq!(reparsed, records);
    }
}
