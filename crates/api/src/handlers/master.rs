//! Handlers for the platform (master admin) console.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use vowline_core::error::CoreError;
use vowline_core::roles::normalize_email;
use vowline_core::theme::system_themes;
use vowline_core::types::DbId;
use vowline_db::models::principal::{CreatePlanner, Planner};
use vowline_db::models::theme::Theme;
use vowline_db::repositories::{FamilyRepo, PlannerRepo, ThemeRepo, WeddingRepo};

use super::{hash_new_password, require_name};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireMasterAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/master/planners
pub async fn list_planners(
    _access: RequireMasterAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Planner>>>> {
    let planners = PlannerRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: planners }))
}

/// POST /api/master/planners
pub async fn create_planner(
    _access: RequireMasterAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreatePlanner>,
) -> AppResult<impl IntoResponse> {
    require_name(&input.name, "Planner")?;
    let email = normalize_email(&input.email);
    if !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email is required".into(),
        )));
    }
    let hash = hash_new_password(input.password.as_deref())?;

    let planner = PlannerRepo::create(&state.pool, &email, &input, hash.as_deref()).await?;
    tracing::info!(planner_id = planner.id, "Planner created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: planner })))
}

async fn set_enabled(state: &AppState, id: DbId, enabled: bool) -> AppResult<Planner> {
    let planner = PlannerRepo::set_enabled(&state.pool, id, enabled)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Planner",
            id,
        }))?;
    tracing::info!(planner_id = id, enabled, "Planner access changed");
    Ok(planner)
}

/// POST /api/master/planners/{id}/enable
pub async fn enable_planner(
    _access: RequireMasterAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Planner>>> {
    let planner = set_enabled(&state, id, true).await?;
    Ok(Json(DataResponse { data: planner }))
}

/// POST /api/master/planners/{id}/disable
///
/// Takes effect for live sessions at their next revalidation.
pub async fn disable_planner(
    _access: RequireMasterAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Planner>>> {
    let planner = set_enabled(&state, id, false).await?;
    Ok(Json(DataResponse { data: planner }))
}

#[derive(Debug, Serialize)]
pub struct PlatformStats {
    pub planners_total: i64,
    pub planners_enabled: i64,
    pub weddings_total: i64,
    pub weddings_active: i64,
    pub families_total: i64,
}

/// GET /api/master/stats
pub async fn stats(
    _access: RequireMasterAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PlatformStats>>> {
    let ((planners_total, planners_enabled), (weddings_total, weddings_active), families_total) =
        tokio::try_join!(
            PlannerRepo::counts(&state.pool),
            WeddingRepo::counts(&state.pool),
            FamilyRepo::count_all(&state.pool),
        )?;
    Ok(Json(DataResponse {
        data: PlatformStats {
            planners_total,
            planners_enabled,
            weddings_total,
            weddings_active,
            families_total,
        },
    }))
}

/// GET /api/master/themes
pub async fn list_themes(
    _access: RequireMasterAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Theme>>>> {
    let themes = ThemeRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: themes }))
}

#[derive(Debug, Serialize)]
pub struct SeedResult {
    pub seeded: u64,
}

/// POST /api/master/themes/seed
///
/// Upserts the built-in themes by key; running it again changes nothing.
pub async fn seed_themes(
    _access: RequireMasterAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SeedResult>>> {
    let seeded = ThemeRepo::seed_system(&state.pool, &system_themes()).await?;
    tracing::info!(seeded, "System themes seeded");
    Ok(Json(DataResponse {
        data: SeedResult { seeded },
    }))
}
