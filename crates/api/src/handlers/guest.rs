//! Handlers for the guest RSVP surface, `/guest/{token}`.
//!
//! Guests authenticate with their family's magic token alone. A token that is
//! malformed, unknown, or belongs to an inactive wedding is `INVALID_TOKEN`.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use vowline_core::error::CoreError;
use vowline_core::invitation::{render_invitation, validate_blocks, Block, RenderContext};
use vowline_core::magic_link::{is_well_formed, rsvp_cutoff_passed, rsvp_link};
use vowline_core::rsvp::{family_rsvp_status, validate_submission, RsvpStatus, RsvpSubmission};
use vowline_core::templates::TemplateType;
use vowline_core::tracking::TrackingEventType;
use vowline_core::types::{DbId, Timestamp};
use vowline_db::models::family::{Family, FamilyMember};
use vowline_db::models::wedding::Wedding;
use vowline_db::repositories::{
    FamilyMemberRepo, FamilyRepo, InvitationTemplateRepo, MessageTemplateRepo, ThemeRepo,
    WeddingRepo,
};
use vowline_events::compose::{compose, family_languages, parse_templates, template_context};
use vowline_events::TrackingEvent;

use super::normalize_language;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct GuestWedding {
    pub couple_names: String,
    pub wedding_date: NaiveDate,
    pub wedding_time: String,
    pub location: String,
    pub venue_address: Option<String>,
    pub dress_code: Option<String>,
    pub additional_info: Option<String>,
    pub default_language: String,
    pub rsvp_cutoff_date: Option<Timestamp>,
}

impl From<&Wedding> for GuestWedding {
    fn from(w: &Wedding) -> Self {
        Self {
            couple_names: w.couple_names.clone(),
            wedding_date: w.wedding_date,
            wedding_time: w.wedding_time.clone(),
            location: w.location.clone(),
            venue_address: w.venue_address.clone(),
            dress_code: w.dress_code.clone(),
            additional_info: w.additional_info.clone(),
            default_language: w.default_language.clone(),
            rsvp_cutoff_date: w.rsvp_cutoff_date,
        }
    }
}

/// Response of `GET /guest/{token}`.
#[derive(Debug, Serialize)]
pub struct GuestView {
    pub wedding_id: DbId,
    pub family_id: DbId,
    pub family_name: String,
    pub preferred_language: String,
    pub rsvp_submitted_at: Option<Timestamp>,
    pub status: RsvpStatus,
    /// `false` once the RSVP cutoff has passed; answers are then read-only.
    pub rsvp_open: bool,
    pub wedding: GuestWedding,
    /// The wedding theme's config, when one is chosen.
    pub theme: Option<serde_json::Value>,
    pub members: Vec<FamilyMember>,
}

impl GuestView {
    fn build(
        family: Family,
        wedding: &Wedding,
        theme: Option<serde_json::Value>,
        members: Vec<FamilyMember>,
    ) -> Self {
        let attendance: Vec<Option<bool>> = members.iter().map(|m| m.attending).collect();
        Self {
            wedding_id: wedding.id,
            family_id: family.id,
            family_name: family.name,
            preferred_language: family.preferred_language,
            rsvp_submitted_at: family.rsvp_submitted_at,
            status: family_rsvp_status(&attendance),
            rsvp_open: !rsvp_cutoff_passed(wedding.rsvp_cutoff_date, Utc::now()),
            wedding: GuestWedding::from(wedding),
            theme,
            members,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RenderedInvitation {
    pub template_id: DbId,
    pub html: String,
    pub theme: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Token resolution
// ---------------------------------------------------------------------------

/// Resolve a magic token to its family and that family's active wedding.
pub(crate) async fn resolve_token(state: &AppState, token: &str) -> AppResult<(Family, Wedding)> {
    if !is_well_formed(token) {
        return Err(AppError::Core(CoreError::InvalidToken));
    }
    let family = FamilyRepo::find_by_token(&state.pool, token)
        .await?
        .ok_or(AppError::Core(CoreError::InvalidToken))?;
    let wedding = WeddingRepo::find_by_id(&state.pool, family.wedding_id)
        .await?
        .filter(|w| w.is_active)
        .ok_or(AppError::Core(CoreError::InvalidToken))?;
    Ok((family, wedding))
}

async fn wedding_theme(state: &AppState, wedding: &Wedding) -> AppResult<Option<serde_json::Value>> {
    Ok(match wedding.theme_id {
        Some(id) => ThemeRepo::find_by_id(&state.pool, id).await?.map(|t| t.config),
        None => None,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/guest/{token}
///
/// The family, its members and the wedding details. Records `LINK_OPENED`.
pub async fn get_invitation(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<GuestView>>> {
    let (family, wedding) = resolve_token(&state, &token).await?;
    let members = FamilyMemberRepo::list_for_family(&state.pool, family.id).await?;
    let theme = wedding_theme(&state, &wedding).await?;

    state
        .tracking
        .publish(TrackingEvent::new(wedding.id, TrackingEventType::LinkOpened).with_family(family.id));

    Ok(Json(DataResponse {
        data: GuestView::build(family, &wedding, theme, members),
    }))
}

/// POST /api/guest/{token}/rsvp
///
/// Record the family's answers. Rejected with `RSVP_CLOSED` after the cutoff.
pub async fn submit_rsvp(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(input): Json<RsvpSubmission>,
) -> AppResult<Json<DataResponse<GuestView>>> {
    let input = input.trimmed();
    let (family, wedding) = resolve_token(&state, &token).await?;
    let members = FamilyMemberRepo::list_for_family(&state.pool, family.id).await?;
    let member_ids: Vec<DbId> = members.iter().map(|m| m.id).collect();

    let cutoff_passed = rsvp_cutoff_passed(wedding.rsvp_cutoff_date, Utc::now());
    validate_submission(&member_ids, &input, cutoff_passed)?;
    let language = normalize_language(input.preferred_language.clone())?;

    let write =
        FamilyRepo::submit_rsvp(&state.pool, family.id, &input, language.as_deref()).await?;

    let attending = input.members.iter().filter(|m| m.attending).count()
        + input.new_members.iter().filter(|m| m.attending).count();
    let event_type = if write.first_response {
        TrackingEventType::RsvpSubmitted
    } else {
        TrackingEventType::RsvpUpdated
    };
    state.tracking.publish(
        TrackingEvent::new(wedding.id, event_type)
            .with_family(family.id)
            .with_metadata(serde_json::json!({ "attending": attending })),
    );
    if write.members_added > 0 {
        state.tracking.publish(
            TrackingEvent::new(wedding.id, TrackingEventType::GuestAdded)
                .with_family(family.id)
                .with_metadata(serde_json::json!({ "count": write.members_added })),
        );
    }

    tracing::info!(
        wedding_id = wedding.id,
        family_id = family.id,
        attending,
        first_response = write.first_response,
        "RSVP submitted"
    );

    let family = FamilyRepo::find_in_wedding(&state.pool, wedding.id, family.id)
        .await?
        .ok_or(AppError::Core(CoreError::InvalidToken))?;
    let members = FamilyMemberRepo::list_for_family(&state.pool, family.id).await?;
    let theme = wedding_theme(&state, &wedding).await?;

    tokio::spawn(send_confirmation(state.clone(), wedding.clone(), family.clone()));

    Ok(Json(DataResponse {
        data: GuestView::build(family, &wedding, theme, members),
    }))
}

/// GET /api/guest/{token}/invitation
///
/// The wedding's active invitation template rendered for this family.
pub async fn render_for_guest(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<RenderedInvitation>>> {
    let (family, wedding) = resolve_token(&state, &token).await?;
    let template = InvitationTemplateRepo::find_active(&state.pool, wedding.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "InvitationTemplate",
            id: wedding.id,
        }))?;

    let blocks: Vec<Block> = serde_json::from_value(template.blocks)
        .map_err(|e| AppError::InternalError(format!("Stored invitation blocks are invalid: {e}")))?;
    validate_blocks(&blocks)?;

    let chain = family_languages(&wedding, &family);
    let link = rsvp_link(&state.config.public_base_url, &family.magic_token);
    let variables = template_context(&wedding, &family, chain[0], &link);
    let today = Utc::now().date_naive();
    let html = render_invitation(
        &blocks,
        &RenderContext {
            variables: &variables,
            chain: &chain,
            days_until_wedding: Some((wedding.wedding_date - today).num_days()),
        },
    );

    let theme = wedding_theme(&state, &wedding).await?;

    Ok(Json(DataResponse {
        data: RenderedInvitation {
            template_id: template.id,
            html,
            theme,
        },
    }))
}

// ---------------------------------------------------------------------------
// Confirmation message
// ---------------------------------------------------------------------------

/// Best-effort RSVP confirmation. Failures are logged and tracked, never
/// surfaced to the guest.
async fn send_confirmation(state: AppState, wedding: Wedding, family: Family) {
    let rows = match MessageTemplateRepo::list_for_wedding(
        &state.pool,
        wedding.id,
        Some(TemplateType::Confirmation.as_str()),
    )
    .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(family_id = family.id, error = %e, "Could not load confirmation templates");
            return;
        }
    };
    let templates = parse_templates(&rows);
    let link = rsvp_link(&state.config.public_base_url, &family.magic_token);
    let Some(message) = compose(
        TemplateType::Confirmation,
        &wedding,
        &family,
        &templates,
        &link,
        |c| state.dispatcher.supports(c),
    ) else {
        tracing::debug!(family_id = family.id, "No usable channel for confirmation");
        return;
    };

    let event = match state.dispatcher.send(&message).await {
        Ok(()) => TrackingEvent::new(wedding.id, TrackingEventType::MessageDelivered),
        Err(e) => {
            tracing::warn!(family_id = family.id, error = %e, "Confirmation delivery failed");
            TrackingEvent::new(wedding.id, TrackingEventType::MessageFailed).with_metadata(
                serde_json::json!({
                    "template_type": TemplateType::Confirmation.as_str(),
                    "error": e.to_string(),
                }),
            )
        }
    };
    state
        .tracking
        .publish(event.with_family(family.id).with_channel(message.channel));
}
