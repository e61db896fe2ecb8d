pub mod admin;
pub mod auth;
pub mod guest;
pub mod health;
pub mod master;
pub mod planner;
pub mod short_url;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/sign-in                       sign in (public)
/// /auth/session                       current session (requires auth)
///
/// /guest/{token}                      family, members, wedding (magic link)
/// /guest/{token}/rsvp                 submit answers (POST)
/// /guest/{token}/invitation           rendered invitation
///
/// /admin/...                          wedding admin console (see admin.rs)
/// /planner/...                        planner console (see planner.rs)
/// /master/...                         platform console (see master.rs)
/// ```
///
/// `/health` and `/s/{code}` live at the root, outside this tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/guest", guest::router())
        .nest("/admin", admin::router())
        .nest("/planner", planner::router())
        .nest("/master", master::router())
}
