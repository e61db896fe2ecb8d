//! Route definitions for the platform console, mounted at `/master`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::master;
use crate::state::AppState;

/// ```text
/// GET, POST   /planners
/// POST        /planners/{id}/enable
/// POST        /planners/{id}/disable
/// GET         /stats
/// GET         /themes
/// POST        /themes/seed
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/planners",
            get(master::list_planners).post(master::create_planner),
        )
        .route("/planners/{id}/enable", post(master::enable_planner))
        .route("/planners/{id}/disable", post(master::disable_planner))
        .route("/stats", get(master::stats))
        .route("/themes", get(master::list_themes))
        .route("/themes/seed", post(master::seed_themes))
}
