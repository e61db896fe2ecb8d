//! End-to-end flows against a real database: onboarding a planner, signing
//! in, creating a wedding and a family, and the guest answering by magic link.
//!
//! `#[sqlx::test]` creates a scratch database per test from `DATABASE_URL`.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    body_json, build_test_app, get, get_auth, master_token, planner_token, post_json,
    post_json_auth, send,
};
use serde_json::{json, Value};
use sqlx::PgPool;

const PASSWORD: &str = "correct-horse-battery";

async fn create_planner(pool: &PgPool, email: &str) -> i64 {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/master/planners",
        &master_token(),
        json!({ "email": email, "name": "Rosa Planner", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn create_wedding(pool: &PgPool, planner_id: i64) -> i64 {
    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/planner/weddings",
        &planner_token(planner_id),
        json!({ "couple_names": "Ana & Luis", "wedding_date": "2027-06-12" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn admin_post(pool: &PgPool, planner_id: i64, wedding_id: i64, uri: &str, body: Value) -> Value {
    let request = Request::post(uri)
        .header("authorization", format!("Bearer {}", planner_token(planner_id)))
        .header("x-wedding-id", wedding_id.to_string())
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = send(build_test_app(pool.clone()), request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn planner_signs_in_with_password(pool: PgPool) {
    let planner_id = create_planner(&pool, "Rosa@Example.com").await;

    let response = post_json(
        build_test_app(pool.clone()),
        "/api/auth/sign-in",
        json!({ "email": "rosa@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["session"]["role"], "planner");
    assert_eq!(json["data"]["session"]["planner_id"], planner_id);

    let token = json["data"]["token"].as_str().unwrap().to_string();
    let response = get_auth(build_test_app(pool), "/api/auth/session", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn wrong_password_is_unauthorized(pool: PgPool) {
    create_planner(&pool, "rosa@example.com").await;

    let response = post_json(
        build_test_app(pool),
        "/api/auth/sign-in",
        json!({ "email": "rosa@example.com", "password": "not-the-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn disabled_planner_cannot_sign_in(pool: PgPool) {
    let planner_id = create_planner(&pool, "rosa@example.com").await;

    let request = Request::post(format!("/api/master/planners/{planner_id}/disable"))
        .header("authorization", format!("Bearer {}", master_token()))
        .body(Body::empty())
        .unwrap();
    let response = send(build_test_app(pool.clone()), request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        build_test_app(pool),
        "/api/auth/sign-in",
        json!({ "email": "rosa@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"]["code"], "PLANNER_DISABLED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_planner_email_conflicts(pool: PgPool) {
    create_planner(&pool, "rosa@example.com").await;

    let response = post_json_auth(
        build_test_app(pool),
        "/api/master/planners",
        &master_token(),
        json!({ "email": "rosa@example.com", "name": "Someone Else" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Tenant isolation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn planner_cannot_open_another_planners_wedding(pool: PgPool) {
    let owner = create_planner(&pool, "owner@example.com").await;
    let other = create_planner(&pool, "other@example.com").await;
    let wedding_id = create_wedding(&pool, owner).await;

    let response = get_auth(
        build_test_app(pool.clone()),
        &format!("/api/planner/weddings/{wedding_id}"),
        &planner_token(other),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = Request::get("/api/admin/guests")
        .header("authorization", format!("Bearer {}", planner_token(other)))
        .header("x-wedding-id", wedding_id.to_string())
        .body(Body::empty())
        .unwrap();
    let response = send(build_test_app(pool), request).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Guest RSVP by magic link
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn guest_answers_by_magic_link(pool: PgPool) {
    let planner_id = create_planner(&pool, "rosa@example.com").await;
    let wedding_id = create_wedding(&pool, planner_id).await;

    let family = admin_post(
        &pool,
        planner_id,
        wedding_id,
        "/api/admin/guests",
        json!({
            "name": "The Garcias",
            "email": "garcia@example.com",
            "members": [{ "name": "Maria" }, { "name": "Pablo", "member_type": "CHILD", "age": 8 }],
        }),
    )
    .await;
    let token = family["data"]["magic_token"].as_str().unwrap().to_string();
    let member_ids: Vec<i64> = family["data"]["members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_i64().unwrap())
        .collect();
    assert_eq!(member_ids.len(), 2);

    let response = get(build_test_app(pool.clone()), &format!("/api/guest/{token}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["data"]["status"], "pending");
    assert_eq!(view["data"]["rsvp_open"], true);

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/guest/{token}/rsvp"),
        json!({
            "members": [
                { "member_id": member_ids[0], "attending": true, "dietary_restrictions": "vegetarian" },
                { "member_id": member_ids[1], "attending": false },
            ],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["data"]["status"], "attending");
    assert!(view["data"]["rsvp_submitted_at"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_magic_token_is_invalid(pool: PgPool) {
    let response = get(build_test_app(pool), "/api/guest/this-token-does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"]["code"], "INVALID_TOKEN");
}

// ---------------------------------------------------------------------------
// Platform themes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn theme_seeding_is_idempotent(pool: PgPool) {
    assert!(seed_themes(&pool).await > 0);
    assert_eq!(seed_themes(&pool).await, 0);
}

async fn seed_themes(pool: &PgPool) -> u64 {
    let request = Request::post("/api/master/themes/seed")
        .header("authorization", format!("Bearer {}", master_token()))
        .body(Body::empty())
        .unwrap();
    let response = send(build_test_app(pool.clone()), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["seeded"].as_u64().unwrap()
}
