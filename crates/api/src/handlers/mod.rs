pub mod auth;
pub mod guest;
pub mod guests;
pub mod master;
pub mod notifications;
pub mod payments;
pub mod planner;
pub mod reminders;
pub mod reports;
pub mod seating;
pub mod short_url;
pub mod templates;
pub mod wedding;

use vowline_core::channels::Channel;
use vowline_core::error::CoreError;
use vowline_core::i18n::Language;
use vowline_core::rsvp::MemberType;
use vowline_core::types::DbId;
use vowline_db::models::wedding::Wedding;
use vowline_db::repositories::WeddingRepo;
use vowline_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};

// ---------------------------------------------------------------------------
// Shared input normalization
// ---------------------------------------------------------------------------

/// Canonical language code (`"es-MX"` becomes `"es"`).
pub(crate) fn normalize_language(code: Option<String>) -> AppResult<Option<String>> {
    code.map(|c| Language::parse(&c).map(|l| l.as_str().to_string()))
        .transpose()
        .map_err(AppError::from)
}

/// Canonical channel name (`EMAIL`, `SMS`, `WHATSAPP`). Blank means no preference.
pub(crate) fn normalize_channel(channel: Option<String>) -> AppResult<Option<String>> {
    channel
        .filter(|c| !c.trim().is_empty())
        .map(|c| Channel::from_str_db(&c).map(|ch| ch.as_str().to_string()))
        .transpose()
        .map_err(AppError::from)
}

pub(crate) fn normalize_member_type(member_type: Option<String>) -> AppResult<Option<String>> {
    member_type
        .map(|t| MemberType::from_str_db(&t).map(|m| m.as_str().to_string()))
        .transpose()
        .map_err(AppError::from)
}

/// Trimmed free text for a new record; blank becomes `None`. Guest-list values
/// are stored trimmed so a CSV export re-imports unchanged.
pub(crate) fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trimmed free text for an edit. A blank value is kept so it can clear the field.
pub(crate) fn clean_edit(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

pub(crate) fn require_name(name: &str, entity: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{entity} name must not be empty"
        ))));
    }
    Ok(())
}

/// Check and hash an optional initial password. Principals created without one
/// cannot sign in with credentials.
pub(crate) fn hash_new_password(password: Option<&str>) -> AppResult<Option<String>> {
    password
        .map(|password| {
            validate_password_strength(password, MIN_PASSWORD_LENGTH)
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
            hash_password(password)
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
        })
        .transpose()
}

/// Load a wedding the caller has already been authorized for.
pub(crate) async fn load_wedding(pool: &DbPool, wedding_id: DbId) -> AppResult<Wedding> {
    WeddingRepo::find_by_id(pool, wedding_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Wedding",
            id: wedding_id,
        }))
}
