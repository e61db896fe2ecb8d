//! Route definitions for the planner console, mounted at `/planner`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{payments, planner};
use crate::state::AppState;

/// ```text
/// GET                 /dashboard
/// GET, POST           /weddings
/// GET, PATCH          /weddings/{id}
/// POST                /weddings/{id}/admins
///
/// GET, POST           /weddings/{wedding_id}/providers
/// PUT, DELETE         /weddings/{wedding_id}/providers/{id}
/// POST                /weddings/{wedding_id}/providers/{id}/payments
/// GET                 /weddings/{wedding_id}/payments
/// POST                /weddings/{wedding_id}/payments/{id}/paid
/// DELETE              /weddings/{wedding_id}/payments/{id}
/// GET                 /weddings/{wedding_id}/ledger
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(planner::dashboard))
        .route(
            "/weddings",
            get(planner::list_weddings).post(planner::create_wedding),
        )
        .route(
            "/weddings/{wedding_id}",
            get(planner::get_wedding).patch(planner::update_wedding),
        )
        .route(
            "/weddings/{wedding_id}/admins",
            post(planner::add_wedding_admin),
        )
        // Providers and payments.
        .route(
            "/weddings/{wedding_id}/providers",
            get(payments::list_providers).post(payments::create_provider),
        )
        .route(
            "/weddings/{wedding_id}/providers/{id}",
            put(payments::update_provider).delete(payments::delete_provider),
        )
        .route(
            "/weddings/{wedding_id}/providers/{id}/payments",
            post(payments::record_payment),
        )
        .route(
            "/weddings/{wedding_id}/payments",
            get(payments::list_payments),
        )
        .route(
            "/weddings/{wedding_id}/payments/{id}",
            delete(payments::delete_payment),
        )
        .route(
            "/weddings/{wedding_id}/payments/{id}/paid",
            post(payments::mark_paid),
        )
        .route("/weddings/{wedding_id}/ledger", get(payments::ledger))
}
