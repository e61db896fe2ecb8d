//! Handlers that send messages to guests: bulk reminders and single
//! invitations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use vowline_core::channels::Channel;
use vowline_core::error::CoreError;
use vowline_core::magic_link::rsvp_link;
use vowline_core::templates::TemplateType;
use vowline_core::tracking::TrackingEventType;
use vowline_core::types::DbId;
use vowline_db::repositories::{FamilyRepo, MessageTemplateRepo, ShortUrlRepo};
use vowline_events::compose::{compose, parse_templates};
use vowline_events::TrackingEvent;

use super::load_wedding;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireWeddingAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RemindersQueued {
    pub pending_families: usize,
}

/// POST /api/admin/reminders
///
/// Queues reminders for every family that has not answered and returns
/// `202 Accepted` at once. Outcomes show up as tracking events.
pub async fn send_reminders(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let pending = FamilyRepo::list_pending(&state.pool, access.wedding_id).await?;
    state.reminders.spawn(access.wedding_id);

    tracing::info!(
        wedding_id = access.wedding_id,
        pending = pending.len(),
        requested_by = %access.user.email,
        "Reminder batch queued"
    );
    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: RemindersQueued {
                pending_families: pending.len(),
            },
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct InvitationOutcome {
    pub channel: Channel,
    pub delivered: bool,
    pub error: Option<String>,
}

/// POST /api/admin/guests/{id}/invite
///
/// Send the invitation message to one family now. A delivery failure is
/// reported in the body and recorded as `MESSAGE_FAILED`.
pub async fn send_invitation(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(family_id): Path<DbId>,
) -> AppResult<Json<DataResponse<InvitationOutcome>>> {
    let family = FamilyRepo::find_in_wedding(&state.pool, access.wedding_id, family_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Family",
            id: family_id,
        }))?;
    let wedding = load_wedding(&state.pool, access.wedding_id).await?;

    let rows = MessageTemplateRepo::list_for_wedding(
        &state.pool,
        wedding.id,
        Some(TemplateType::Invitation.as_str()),
    )
    .await?;
    let base = &state.config.public_base_url;
    let rsvp_url = match ShortUrlRepo::get_or_create(&state.pool, family.id).await? {
        Some(short) => format!("{base}/s/{}", short.code),
        None => rsvp_link(base, &family.magic_token),
    };

    let message = compose(
        TemplateType::Invitation,
        &wedding,
        &family,
        &parse_templates(&rows),
        &rsvp_url,
        |c| state.dispatcher.supports(c),
    )
    .ok_or(AppError::Core(CoreError::Validation(
        "Family has no reachable address on a configured channel".into(),
    )))?;

    let event = TrackingEvent::new(wedding.id, TrackingEventType::InvitationSent)
        .with_family(family.id)
        .with_channel(message.channel)
        .by_admin();

    let outcome = match state.dispatcher.send(&message).await {
        Ok(()) => {
            state.tracking.publish(event);
            InvitationOutcome {
                channel: message.channel,
                delivered: true,
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(family_id = family.id, error = %e, "Invitation delivery failed");
            state.tracking.publish(
                TrackingEvent {
                    event_type: TrackingEventType::MessageFailed,
                    ..event
                }
                .with_metadata(serde_json::json!({
                    "template_type": TemplateType::Invitation.as_str(),
                    "error": e.to_string(),
                })),
            );
            InvitationOutcome {
                channel: message.channel,
                delivered: false,
                error: Some(e.to_string()),
            }
        }
    };
    Ok(Json(DataResponse { data: outcome }))
}
