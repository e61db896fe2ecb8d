//! Route definitions for the guest RSVP surface, mounted at `/guest`.
//!
//! Authenticated by the magic token in the path; no session is involved.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::guest;
use crate::state::AppState;

/// ```text
/// GET  /{token}              -> get_invitation
/// POST /{token}/rsvp         -> submit_rsvp
/// GET  /{token}/invitation   -> render_for_guest
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{token}", get(guest::get_invitation))
        .route("/{token}/rsvp", post(guest::submit_rsvp))
        .route("/{token}/invitation", get(guest::render_for_guest))
}
