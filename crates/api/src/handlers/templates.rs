//! Handlers for message templates and invitation (block) templates.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use vowline_core::channels::Channel;
use vowline_core::error::CoreError;
use vowline_core::i18n::{fallback_chain, format_date, Language};
use vowline_core::invitation::{render_invitation, validate_blocks, Block, RenderContext};
use vowline_core::magic_link::rsvp_link;
use vowline_core::templates::{
    render, select_template, sms_segments, validate_placeholders, whatsapp_variables,
    TemplateContext, TemplateType, WhatsappPayload,
};
use vowline_core::tracking::TrackingEventType;
use vowline_core::types::DbId;
use vowline_db::models::template::{
    CreateInvitationTemplate, InvitationTemplate, UpdateInvitationTemplate, UpsertMessageTemplate,
};
use vowline_db::models::wedding::Wedding;
use vowline_db::repositories::{FamilyRepo, InvitationTemplateRepo, MessageTemplateRepo};
use vowline_events::compose::{family_languages, parse_templates, template_context};
use vowline_events::TrackingEvent;

use super::{load_wedding, require_name};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireWeddingAdmin;
use crate::query::TemplateTypeParams;
use crate::response::DataResponse;
use crate::state::AppState;

const SAMPLE_FAMILY_NAME: &str = "Sample Family";

fn invitation_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "InvitationTemplate",
        id,
    })
}

/// Variables for previews without a real family.
fn sample_context(wedding: &Wedding, language: Language, base_url: &str) -> TemplateContext {
    let cutoff = wedding
        .rsvp_cutoff_date
        .map(|c| format_date(c.date_naive(), language))
        .unwrap_or_default();
    TemplateContext::new()
        .with("family_name", SAMPLE_FAMILY_NAME)
        .with("couple_names", wedding.couple_names.as_str())
        .with("wedding_date", format_date(wedding.wedding_date, language))
        .with("wedding_time", wedding.wedding_time.as_str())
        .with("location", wedding.location.as_str())
        .with("rsvp_link", rsvp_link(base_url, "preview"))
        .with("rsvp_cutoff_date", cutoff)
}

/// Language chain and variables for a preview, for a real family when
/// `family_id` is given.
async fn preview_context(
    state: &AppState,
    wedding: &Wedding,
    family_id: Option<DbId>,
    language: Option<Language>,
) -> AppResult<(Vec<Language>, TemplateContext)> {
    let base = &state.config.public_base_url;
    match family_id {
        Some(id) => {
            let family = FamilyRepo::find_in_wedding(&state.pool, wedding.id, id)
                .await?
                .ok_or(AppError::Core(CoreError::NotFound {
                    entity: "Family",
                    id,
                }))?;
            let chain = match language {
                Some(lang) => fallback_chain(
                    Some(lang),
                    Language::parse_or_default(Some(&wedding.default_language)),
                ),
                None => family_languages(wedding, &family),
            };
            let link = rsvp_link(base, &family.magic_token);
            let ctx = template_context(wedding, &family, chain[0], &link);
            Ok((chain, ctx))
        }
        None => {
            let chain = fallback_chain(
                language,
                Language::parse_or_default(Some(&wedding.default_language)),
            );
            let ctx = sample_context(wedding, chain[0], base);
            Ok((chain, ctx))
        }
    }
}

// ---------------------------------------------------------------------------
// Message templates
// ---------------------------------------------------------------------------

/// GET /api/admin/templates?template_type=
pub async fn list_message_templates(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Query(params): Query<TemplateTypeParams>,
) -> AppResult<impl IntoResponse> {
    let template_type = params
        .template_type
        .as_deref()
        .map(TemplateType::from_str_db)
        .transpose()?;
    let rows = MessageTemplateRepo::list_for_wedding(
        &state.pool,
        access.wedding_id,
        template_type.map(|t| t.as_str()),
    )
    .await?;
    Ok(Json(DataResponse { data: rows }))
}

/// PUT /api/admin/templates
///
/// Create or replace the template for one `(type, language, channel)` slot.
pub async fn upsert_message_template(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<UpsertMessageTemplate>,
) -> AppResult<impl IntoResponse> {
    let template_type = TemplateType::from_str_db(&input.template_type)?;
    let language = Language::parse(&input.language)?;
    let channel = Channel::from_str_db(&input.channel)?;
    if input.body.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Template body must not be empty".into(),
        )));
    }
    validate_placeholders(&input.body)?;
    if let Some(subject) = &input.subject {
        validate_placeholders(subject)?;
    }
    if channel != Channel::Email {
        input.subject = None;
    }
    if channel != Channel::Whatsapp {
        input.content_sid = None;
    }
    input.template_type = template_type.as_str().to_string();
    input.language = language.as_str().to_string();
    input.channel = channel.as_str().to_string();

    let row = MessageTemplateRepo::upsert(&state.pool, access.wedding_id, &input).await?;

    state.tracking.publish(
        TrackingEvent::new(access.wedding_id, TrackingEventType::TemplateUpdated)
            .with_channel(channel)
            .with_metadata(serde_json::json!({
                "template_id": row.id,
                "template_type": row.template_type,
                "language": row.language,
            }))
            .by_admin(),
    );
    Ok(Json(DataResponse { data: row }))
}

/// DELETE /api/admin/templates/{id}
///
/// The slot falls back to the built-in default afterwards.
pub async fn delete_message_template(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !MessageTemplateRepo::delete(&state.pool, access.wedding_id, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "MessageTemplate",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub template_type: String,
    pub channel: String,
    pub language: Option<String>,
    /// Unsaved text to preview instead of the stored template.
    pub subject: Option<String>,
    pub body: Option<String>,
    pub family_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct MessagePreview {
    pub channel: Channel,
    pub language: Language,
    pub subject: Option<String>,
    pub body: String,
    /// Only for SMS.
    pub sms_segments: Option<usize>,
    /// Only for WhatsApp: the positional body and its content variables.
    pub whatsapp: Option<WhatsappPayload>,
}

/// POST /api/admin/templates/preview
pub async fn preview_message(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Json(input): Json<PreviewRequest>,
) -> AppResult<Json<DataResponse<MessagePreview>>> {
    let template_type = TemplateType::from_str_db(&input.template_type)?;
    let channel = Channel::from_str_db(&input.channel)?;
    let language = input.language.as_deref().map(Language::parse).transpose()?;

    let wedding = load_wedding(&state.pool, access.wedding_id).await?;
    let (chain, ctx) = preview_context(&state, &wedding, input.family_id, language).await?;

    let (language, subject, body) = match input.body {
        Some(body) => {
            validate_placeholders(&body)?;
            (chain[0], input.subject, body)
        }
        None => {
            let rows = MessageTemplateRepo::list_for_wedding(
                &state.pool,
                wedding.id,
                Some(template_type.as_str()),
            )
            .await?;
            let template =
                select_template(&parse_templates(&rows), template_type, channel, &chain);
            (template.language, template.subject, template.body)
        }
    };

    let rendered = render(&body, &ctx);
    Ok(Json(DataResponse {
        data: MessagePreview {
            channel,
            language,
            subject: subject
                .filter(|_| channel == Channel::Email)
                .map(|s| render(&s, &ctx)),
            sms_segments: (channel == Channel::Sms).then(|| sms_segments(&rendered)),
            whatsapp: (channel == Channel::Whatsapp).then(|| whatsapp_variables(&body, &ctx)),
            body: rendered,
        },
    }))
}

// ---------------------------------------------------------------------------
// Invitation templates
// ---------------------------------------------------------------------------

fn parse_blocks(value: &serde_json::Value) -> AppResult<Vec<Block>> {
    let blocks: Vec<Block> = serde_json::from_value(value.clone())
        .map_err(|e| AppError::Core(CoreError::Validation(format!("Invalid blocks: {e}"))))?;
    validate_blocks(&blocks)?;
    Ok(blocks)
}

/// GET /api/admin/invitation-templates
pub async fn list_invitation_templates(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<InvitationTemplate>>>> {
    let templates = InvitationTemplateRepo::list_for_wedding(&state.pool, access.wedding_id).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// POST /api/admin/invitation-templates
pub async fn create_invitation_template(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateInvitationTemplate>,
) -> AppResult<impl IntoResponse> {
    require_name(&input.name, "Template")?;
    parse_blocks(&input.blocks)?;
    let template = InvitationTemplateRepo::create(&state.pool, access.wedding_id, &input).await?;
    tracing::info!(
        wedding_id = access.wedding_id,
        template_id = template.id,
        "Invitation template created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// PUT /api/admin/invitation-templates/{id}
pub async fn update_invitation_template(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateInvitationTemplate>,
) -> AppResult<Json<DataResponse<InvitationTemplate>>> {
    if let Some(name) = &input.name {
        require_name(name, "Template")?;
    }
    if let Some(blocks) = &input.blocks {
        parse_blocks(blocks)?;
    }
    let template = InvitationTemplateRepo::update(&state.pool, access.wedding_id, id, &input)
        .await?
        .ok_or_else(|| invitation_not_found(id))?;
    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/admin/invitation-templates/{id}
pub async fn delete_invitation_template(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !InvitationTemplateRepo::delete(&state.pool, access.wedding_id, id).await? {
        return Err(invitation_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/admin/invitation-templates/{id}/activate
///
/// Makes this the template guests see; any other active template is
/// deactivated in the same transaction.
pub async fn activate_invitation_template(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<InvitationTemplate>>> {
    let template = InvitationTemplateRepo::find_in_wedding(&state.pool, access.wedding_id, id)
        .await?
        .ok_or_else(|| invitation_not_found(id))?;
    parse_blocks(&template.blocks)?;
    if !InvitationTemplateRepo::activate(&state.pool, access.wedding_id, id).await? {
        return Err(invitation_not_found(id));
    }
    tracing::info!(wedding_id = access.wedding_id, template_id = id, "Invitation template activated");
    Ok(Json(DataResponse {
        data: InvitationTemplate {
            is_active: true,
            ..template
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct InvitationPreviewParams {
    pub family_id: Option<DbId>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvitationPreview {
    pub template_id: DbId,
    pub html: String,
}

/// GET /api/admin/invitation-templates/{id}/preview?family_id=&language=
pub async fn preview_invitation_template(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<InvitationPreviewParams>,
) -> AppResult<Json<DataResponse<InvitationPreview>>> {
    let template = InvitationTemplateRepo::find_in_wedding(&state.pool, access.wedding_id, id)
        .await?
        .ok_or_else(|| invitation_not_found(id))?;
    let blocks = parse_blocks(&template.blocks)?;
    let language = params.language.as_deref().map(Language::parse).transpose()?;

    let wedding = load_wedding(&state.pool, access.wedding_id).await?;
    let (chain, variables) = preview_context(&state, &wedding, params.family_id, language).await?;
    let today = Utc::now().date_naive();
    let html = render_invitation(
        &blocks,
        &RenderContext {
            variables: &variables,
            chain: &chain,
            days_until_wedding: Some((wedding.wedding_date - today).num_days()),
        },
    );
    Ok(Json(DataResponse {
        data: InvitationPreview {
            template_id: template.id,
            html,
        },
    }))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;

    #[test]
    fn sample_context_fills_every_variable() {
        let now = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
        let wedding = Wedding {
            id: 1,
            planner_id: 1,
            couple_names: "Ana & Ben".into(),
            wedding_date: NaiveDate::from_ymd_opt(2027, 6, 12).unwrap(),
            wedding_time: "17:00".into(),
            location: "Lisbon".into(),
            venue_address: None,
            default_language: "en".into(),
            rsvp_cutoff_date: Some(now),
            is_active: true,
            theme_id: None,
            dress_code: None,
            additional_info: None,
            wizard_step: 0,
            wizard_completed: false,
            created_at: now,
            updated_at: now,
        };
        let ctx = sample_context(&wedding, Language::En, "https://app.example");
        for name in vowline_core::templates::VARIABLES {
            assert!(ctx.get(name).is_some_and(|v| !v.is_empty()), "{name} missing");
        }
        assert_eq!(ctx.get("rsvp_link"), Some("https://app.example/rsvp/preview"));
    }

    #[test]
    fn blocks_must_parse_and_validate() {
        assert!(parse_blocks(&serde_json::json!([{ "type": "divider" }])).is_ok());
        assert!(parse_blocks(&serde_json::json!([])).is_err());
        assert!(parse_blocks(&serde_json::json!([{ "type": "mystery" }])).is_err());
    }
}
