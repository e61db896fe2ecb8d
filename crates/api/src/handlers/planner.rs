//! Handlers for the planner console: the planner's weddings, their admins and
//! the dashboard.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use vowline_core::error::CoreError;
use vowline_core::types::DbId;
use vowline_db::models::principal::{CreateWeddingAdmin, WeddingAdmin};
use vowline_db::models::wedding::{CreateWedding, UpdateWedding, Wedding, WeddingGuestCounts};
use vowline_db::repositories::{FamilyRepo, WeddingAdminRepo, WeddingRepo};
use vowline_db::DbPool;

use super::wedding::{check_theme, create_admin, prepare_update};
use super::{normalize_language, require_name};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequirePlanner;
use crate::response::DataResponse;
use crate::state::AppState;

/// The wedding when it belongs to `planner_id`. Another planner's wedding is
/// reported as not found.
pub(crate) async fn owned_wedding(
    pool: &DbPool,
    planner_id: DbId,
    wedding_id: DbId,
) -> AppResult<Wedding> {
    WeddingRepo::find_for_planner(pool, wedding_id, planner_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Wedding",
            id: wedding_id,
        }))
}

/// GET /api/planner/weddings
pub async fn list_weddings(
    access: RequirePlanner,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Wedding>>>> {
    let weddings = WeddingRepo::list_for_planner(&state.pool, access.planner_id).await?;
    Ok(Json(DataResponse { data: weddings }))
}

/// POST /api/planner/weddings
pub async fn create_wedding(
    access: RequirePlanner,
    State(state): State<AppState>,
    Json(mut input): Json<CreateWedding>,
) -> AppResult<impl IntoResponse> {
    require_name(&input.couple_names, "Couple")?;
    input.default_language = normalize_language(input.default_language.take())?;
    if let Some(theme_id) = input.theme_id {
        check_theme(&state.pool, access.planner_id, theme_id).await?;
    }

    let wedding = WeddingRepo::create(&state.pool, access.planner_id, &input).await?;
    tracing::info!(
        planner_id = access.planner_id,
        wedding_id = wedding.id,
        "Wedding created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: wedding })))
}

#[derive(Debug, Serialize)]
pub struct PlannerWeddingView {
    #[serde(flatten)]
    pub wedding: Wedding,
    pub admins: Vec<WeddingAdmin>,
}

/// GET /api/planner/weddings/{id}
pub async fn get_wedding(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PlannerWeddingView>>> {
    let wedding = owned_wedding(&state.pool, access.planner_id, id).await?;
    let admins = WeddingAdminRepo::list_for_wedding(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: PlannerWeddingView { wedding, admins },
    }))
}

/// PATCH /api/planner/weddings/{id}
pub async fn update_wedding(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWedding>,
) -> AppResult<Json<DataResponse<Wedding>>> {
    owned_wedding(&state.pool, access.planner_id, id).await?;
    let input = prepare_update(&state.pool, access.planner_id, input).await?;
    let wedding = WeddingRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Wedding",
            id,
        }))?;
    tracing::info!(wedding_id = id, is_active = wedding.is_active, "Wedding updated by planner");
    Ok(Json(DataResponse { data: wedding }))
}

/// POST /api/planner/weddings/{id}/admins
pub async fn add_wedding_admin(
    access: RequirePlanner,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateWeddingAdmin>,
) -> AppResult<impl IntoResponse> {
    owned_wedding(&state.pool, access.planner_id, id).await?;
    let admin = create_admin(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: admin })))
}

#[derive(Debug, Default, Serialize)]
pub struct PlannerDashboard {
    pub weddings_total: i64,
    pub weddings_active: i64,
    pub families: i64,
    pub families_responded: i64,
    pub members: i64,
    pub members_attending: i64,
    pub weddings: Vec<WeddingGuestCounts>,
}

impl PlannerDashboard {
    fn build(weddings: &[Wedding], counts: Vec<WeddingGuestCounts>) -> Self {
        Self {
            weddings_total: weddings.len() as i64,
            weddings_active: weddings.iter().filter(|w| w.is_active).count() as i64,
            families: counts.iter().map(|c| c.families).sum(),
            families_responded: counts.iter().map(|c| c.families_responded).sum(),
            members: counts.iter().map(|c| c.members).sum(),
            members_attending: counts.iter().map(|c| c.members_attending).sum(),
            weddings: counts,
        }
    }
}

/// GET /api/planner/dashboard
pub async fn dashboard(
    access: RequirePlanner,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<PlannerDashboard>>> {
    let (weddings, counts) = tokio::try_join!(
        WeddingRepo::list_for_planner(&state.pool, access.planner_id),
        FamilyRepo::guest_counts_for_planner(&state.pool, access.planner_id),
    )?;
    Ok(Json(DataResponse {
        data: PlannerDashboard::build(&weddings, counts),
    }))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn counts(wedding_id: DbId, families: i64, responded: i64) -> WeddingGuestCounts {
        WeddingGuestCounts {
            wedding_id,
            couple_names: format!("Couple {wedding_id}"),
            wedding_date: NaiveDate::from_ymd_opt(2027, 6, 12).unwrap(),
            families,
            families_responded: responded,
            members: families * 2,
            members_attending: responded * 2,
        }
    }

    #[test]
    fn dashboard_sums_per_wedding_counts() {
        let dashboard = PlannerDashboard::build(&[], vec![counts(1, 10, 4), counts(2, 5, 5)]);
        assert_eq!(dashboard.families, 15);
        assert_eq!(dashboard.families_responded, 9);
        assert_eq!(dashboard.members, 30);
        assert_eq!(dashboard.members_attending, 18);
        assert_eq!(dashboard.weddings.len(), 2);
        assert_eq!(dashboard.weddings_total, 0);
    }
}
