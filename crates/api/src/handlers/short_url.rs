//! Short RSVP links, `/s/{code}`.

use axum::extract::{Path, State};
use axum::response::Redirect;
use vowline_core::error::CoreError;
use vowline_core::magic_link::rsvp_link;
use vowline_core::short_url::is_valid_code;
use vowline_db::repositories::ShortUrlRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /s/{code}
///
/// Redirect to the full magic-link RSVP page.
pub async fn follow(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<Redirect> {
    if !is_valid_code(&code) {
        return Err(AppError::Core(CoreError::InvalidToken));
    }
    let token = ShortUrlRepo::resolve_token(&state.pool, &code)
        .await?
        .ok_or(AppError::Core(CoreError::InvalidToken))?;
    Ok(Redirect::temporary(&rsvp_link(
        &state.config.public_base_url,
        &token,
    )))
}
