//! Role revalidation of long-lived sessions against the principal tables.
//!
//! Each test signs a session whose roles were last checked over a minute ago,
//! so the middleware re-resolves it before the request reaches a handler.

mod common;

use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use common::{body_json, build_test_app, get_auth, test_config};
use sqlx::PgPool;
use vowline_api::auth::jwt::{encode_session, validate_session};
use vowline_api::middleware::session::SESSION_TOKEN_HEADER;
use vowline_core::roles::{ResolvedRole, Role};
use vowline_core::session::{SessionClaims, PROVIDER_CREDENTIALS};
use vowline_core::types::DbId;
use vowline_db::models::principal::{CreatePlanner, CreateWeddingAdmin};
use vowline_db::models::wedding::CreateWedding;
use vowline_db::repositories::{PlannerRepo, WeddingAdminRepo, WeddingRepo};

/// A session for `email` last checked 61 seconds ago.
fn stale_token(email: &str, resolved: ResolvedRole) -> String {
    let config = test_config();
    let checked = Utc::now().timestamp() - 61;
    let claims = SessionClaims::issue(email, PROVIDER_CREDENTIALS, resolved, checked, 3600);
    encode_session(&claims, &config.jwt).unwrap()
}

fn as_planner(planner_id: DbId) -> ResolvedRole {
    ResolvedRole {
        role: Role::Planner,
        planner_id: Some(planner_id),
        wedding_id: None,
    }
}

fn as_wedding_admin(wedding_id: DbId) -> ResolvedRole {
    ResolvedRole {
        role: Role::WeddingAdmin,
        planner_id: None,
        wedding_id: Some(wedding_id),
    }
}

async fn seed_planner(pool: &PgPool, email: &str) -> DbId {
    let input = CreatePlanner {
        email: email.into(),
        name: "Rosa Planner".into(),
        password: None,
        logo_url: None,
    };
    PlannerRepo::create(pool, email, &input, None).await.unwrap().id
}

async fn seed_wedding(pool: &PgPool, planner_id: DbId, couple_names: &str) -> DbId {
    let input = CreateWedding {
        couple_names: couple_names.into(),
        wedding_date: NaiveDate::from_ymd_opt(2027, 9, 4).unwrap(),
        wedding_time: None,
        location: None,
        venue_address: None,
        default_language: None,
        rsvp_cutoff_date: None,
        theme_id: None,
    };
    WeddingRepo::create(pool, planner_id, &input).await.unwrap().id
}

async fn seed_wedding_admin(pool: &PgPool, wedding_id: DbId, email: &str) {
    let input = CreateWeddingAdmin {
        email: email.into(),
        name: "Ana".into(),
        password: None,
    };
    WeddingAdminRepo::create(pool, wedding_id, email, &input, None)
        .await
        .unwrap();
}

fn refreshed_claims(response: &axum::http::Response<axum::body::Body>) -> SessionClaims {
    let token = response
        .headers()
        .get(SESSION_TOKEN_HEADER)
        .expect("a revalidated session is re-signed")
        .to_str()
        .unwrap();
    validate_session(token, &test_config().jwt).unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn disabled_planner_session_is_ended(pool: PgPool) {
    let planner_id = seed_planner(&pool, "rosa@example.com").await;
    PlannerRepo::set_enabled(&pool, planner_id, false)
        .await
        .unwrap();

    let token = stale_token("rosa@example.com", as_planner(planner_id));
    let response = get_auth(build_test_app(pool), "/api/auth/session", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response.headers().get(SESSION_TOKEN_HEADER).is_none());
    assert_eq!(body_json(response).await["error"]["code"], "PLANNER_DISABLED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn session_of_removed_principal_is_unauthorized(pool: PgPool) {
    let token = stale_token("gone@example.com", as_planner(42));
    let response = get_auth(build_test_app(pool), "/api/auth/session", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SESSION_TOKEN_HEADER).is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unchanged_session_is_re_signed_with_a_fresh_check_time(pool: PgPool) {
    let planner_id = seed_planner(&pool, "rosa@example.com").await;
    let before = Utc::now().timestamp();

    let token = stale_token("rosa@example.com", as_planner(planner_id));
    let response = get_auth(build_test_app(pool), "/api/auth/session", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let claims = refreshed_claims(&response);
    assert_eq!(claims.role, Role::Planner);
    assert_eq!(claims.planner_id, Some(planner_id));
    assert!(claims.checked_at >= before);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn changed_role_is_re_signed_into_the_header(pool: PgPool) {
    let planner_id = seed_planner(&pool, "rosa@example.com").await;
    let wedding_id = seed_wedding(&pool, planner_id, "Ana & Luis").await;
    seed_wedding_admin(&pool, wedding_id, "ana@example.com").await;

    // Issued while ana@ was a planner; that planner row no longer exists.
    let token = stale_token("ana@example.com", as_planner(planner_id + 1000));
    let response = get_auth(build_test_app(pool), "/api/auth/session", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let claims = refreshed_claims(&response);
    assert_eq!(claims.role, Role::WeddingAdmin);
    assert_eq!(claims.wedding_id, Some(wedding_id));
    assert_eq!(claims.planner_id, None);

    let json = body_json(response).await;
    assert_eq!(json["data"]["wedding_id"], wedding_id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn revalidation_keeps_the_sessions_wedding(pool: PgPool) {
    let planner_id = seed_planner(&pool, "rosa@example.com").await;
    let first = seed_wedding(&pool, planner_id, "Ana & Luis").await;
    let second = seed_wedding(&pool, planner_id, "Eva & Tom").await;
    seed_wedding_admin(&pool, first, "family@example.com").await;
    seed_wedding_admin(&pool, second, "family@example.com").await;

    let token = stale_token("family@example.com", as_wedding_admin(first));
    let response = get_auth(build_test_app(pool), "/api/auth/session", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let claims = refreshed_claims(&response);
    assert_eq!(claims.role, Role::WeddingAdmin);
    assert_eq!(claims.wedding_id, Some(first));
}
