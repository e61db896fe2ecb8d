//! Route definitions for the wedding admin console, mounted at `/admin`.
//!
//! Every handler takes `RequireWeddingAdmin`: wedding admins act on their own
//! wedding, planners on one of theirs selected by `x-wedding-id`.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{guests, notifications, reminders, reports, seating, templates, wedding};
use crate::state::AppState;

/// ```text
/// GET, PATCH  /wedding
/// GET         /themes
/// GET, POST   /admins
///
/// GET, POST           /guests
/// GET                 /guests/export
/// POST                /guests/import
/// GET, PUT, DELETE    /guests/{id}
/// POST                /guests/{id}/members
/// GET                 /guests/{id}/link
/// POST                /guests/{id}/invite
/// PUT, DELETE         /members/{id}
///
/// GET                 /seating
/// POST                /seating/assign
/// GET, POST           /tables
/// PUT, DELETE         /tables/{id}
///
/// GET                 /notifications
/// GET                 /notifications/summary
/// POST                /notifications/read-all
/// POST                /notifications/{id}/read
///
/// GET, PUT            /templates
/// POST                /templates/preview
/// DELETE              /templates/{id}
/// GET, POST           /invitation-templates
/// PUT, DELETE         /invitation-templates/{id}
/// POST                /invitation-templates/{id}/activate
/// GET                 /invitation-templates/{id}/preview
///
/// POST                /reminders (202)
/// GET                 /reports/attendance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/wedding",
            get(wedding::get_wedding).patch(wedding::update_wedding),
        )
        .route("/themes", get(wedding::list_themes))
        .route("/admins", get(wedding::list_admins).post(wedding::add_admin))
        // Guest list.
        .route(
            "/guests",
            get(guests::list_families).post(guests::create_family),
        )
        .route("/guests/export", get(guests::export_csv))
        .route("/guests/import", post(guests::import_csv))
        .route(
            "/guests/{id}",
            get(guests::get_family)
                .put(guests::update_family)
                .delete(guests::delete_family),
        )
        .route("/guests/{id}/members", post(guests::add_member))
        .route("/guests/{id}/link", get(guests::family_link))
        .route("/guests/{id}/invite", post(reminders::send_invitation))
        .route(
            "/members/{id}",
            put(guests::update_member).delete(guests::delete_member),
        )
        // Seating.
        .route("/seating", get(seating::get_seating))
        .route("/seating/assign", post(seating::assign_seats))
        .route(
            "/tables",
            get(seating::list_tables).post(seating::create_table),
        )
        .route(
            "/tables/{id}",
            put(seating::update_table).delete(seating::delete_table),
        )
        // Notifications.
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/summary",
            get(notifications::notification_summary),
        )
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        // Message templates.
        .route(
            "/templates",
            get(templates::list_message_templates).put(templates::upsert_message_template),
        )
        .route("/templates/preview", post(templates::preview_message))
        .route("/templates/{id}", delete(templates::delete_message_template))
        // Invitation templates.
        .route(
            "/invitation-templates",
            get(templates::list_invitation_templates)
                .post(templates::create_invitation_template),
        )
        .route(
            "/invitation-templates/{id}",
            put(templates::update_invitation_template)
                .delete(templates::delete_invitation_template),
        )
        .route(
            "/invitation-templates/{id}/activate",
            post(templates::activate_invitation_template),
        )
        .route(
            "/invitation-templates/{id}/preview",
            get(templates::preview_invitation_template),
        )
        // Messaging and reports.
        .route("/reminders", post(reminders::send_reminders))
        .route("/reports/attendance", get(reports::attendance))
}
