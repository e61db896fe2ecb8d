//! Short RSVP link redirects, mounted at the root.

use axum::routing::get;
use axum::Router;

use crate::handlers::short_url;
use crate::state::AppState;

/// ```text
/// GET /s/{code}  -> follow (307 to the RSVP page)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/s/{code}", get(short_url::follow))
}
