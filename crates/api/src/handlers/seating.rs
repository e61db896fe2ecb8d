//! Handlers for tables and seat assignment.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use vowline_core::error::CoreError;
use vowline_core::seating::{seating_stats, validate_table, SeatAssignment, SeatingStats};
use vowline_core::types::DbId;
use vowline_db::models::table::{CreateTable, UpdateTable};
use vowline_db::repositories::{FamilyMemberRepo, TableRepo};
use vowline_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireWeddingAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn table_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Table", id })
}

async fn current_stats(pool: &DbPool, wedding_id: DbId) -> AppResult<SeatingStats> {
    let (tables, members) = tokio::try_join!(
        TableRepo::capacities(pool, wedding_id),
        FamilyMemberRepo::seating_for_wedding(pool, wedding_id),
    )?;
    Ok(seating_stats(&tables, &members))
}

/// GET /api/admin/seating
pub async fn get_seating(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SeatingStats>>> {
    let stats = current_stats(&state.pool, access.wedding_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

#[derive(Debug, Deserialize)]
pub struct AssignSeatsRequest {
    pub assignments: Vec<SeatAssignment>,
}

/// POST /api/admin/seating/assign
///
/// Apply a batch of seat changes atomically. The batch is rejected when any
/// table would end up over capacity.
pub async fn assign_seats(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Json(input): Json<AssignSeatsRequest>,
) -> AppResult<Json<DataResponse<SeatingStats>>> {
    if input.assignments.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No seat assignments given".into(),
        )));
    }
    TableRepo::assign_seats(&state.pool, access.wedding_id, &input.assignments).await?;

    tracing::info!(
        wedding_id = access.wedding_id,
        changes = input.assignments.len(),
        "Seats assigned"
    );
    let stats = current_stats(&state.pool, access.wedding_id).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/admin/tables
pub async fn list_tables(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let tables = TableRepo::list_for_wedding(&state.pool, access.wedding_id).await?;
    Ok(Json(DataResponse { data: tables }))
}

/// POST /api/admin/tables
pub async fn create_table(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateTable>,
) -> AppResult<impl IntoResponse> {
    validate_table(&input.name, input.capacity)?;
    let table = TableRepo::create(&state.pool, access.wedding_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: table })))
}

/// PUT /api/admin/tables/{id}
///
/// Capacity cannot shrink below the number of guests already seated.
pub async fn update_table(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTable>,
) -> AppResult<impl IntoResponse> {
    let existing = TableRepo::find_in_wedding(&state.pool, access.wedding_id, id)
        .await?
        .ok_or_else(|| table_not_found(id))?;
    let name = input.name.as_deref().unwrap_or(&existing.name);
    let capacity = input.capacity.unwrap_or(existing.capacity);
    validate_table(name, capacity)?;

    let table = TableRepo::update(&state.pool, access.wedding_id, id, &input)
        .await?
        .ok_or_else(|| table_not_found(id))?;
    Ok(Json(DataResponse { data: table }))
}

/// DELETE /api/admin/tables/{id}
///
/// Guests seated at the table become unseated.
pub async fn delete_table(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TableRepo::delete(&state.pool, access.wedding_id, id).await? {
        return Err(table_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
