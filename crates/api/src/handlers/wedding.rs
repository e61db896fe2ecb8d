//! Handlers for the wedding itself in the admin console: details, the setup
//! wizard, theme choice and co-admins.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use vowline_core::error::CoreError;
use vowline_core::roles::{normalize_email, Role};
use vowline_core::types::DbId;
use vowline_db::models::principal::{CreateWeddingAdmin, WeddingAdmin};
use vowline_db::models::wedding::{UpdateWedding, Wedding};
use vowline_db::repositories::{ThemeRepo, WeddingAdminRepo, WeddingRepo};
use vowline_db::DbPool;

use super::{hash_new_password, load_wedding, normalize_language, require_name};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireWeddingAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Last step of the setup wizard; reaching it marks the wizard completed.
pub const FINAL_WIZARD_STEP: i32 = 5;

/// Check and normalize a wedding patch. `owner_planner_id` scopes theme choice.
pub(crate) async fn prepare_update(
    pool: &DbPool,
    owner_planner_id: DbId,
    mut input: UpdateWedding,
) -> AppResult<UpdateWedding> {
    if let Some(names) = &input.couple_names {
        require_name(names, "Couple")?;
    }
    input.default_language = normalize_language(input.default_language.take())?;

    if let Some(step) = input.wizard_step {
        if !(0..=FINAL_WIZARD_STEP).contains(&step) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Wizard step must be between 0 and {FINAL_WIZARD_STEP}"
            ))));
        }
        if step == FINAL_WIZARD_STEP && input.wizard_completed.is_none() {
            input.wizard_completed = Some(true);
        }
    }

    if let Some(theme_id) = input.theme_id {
        check_theme(pool, owner_planner_id, theme_id).await?;
    }
    Ok(input)
}

/// A wedding may use system themes and its planner's own themes.
pub(crate) async fn check_theme(pool: &DbPool, planner_id: DbId, theme_id: DbId) -> AppResult<()> {
    let theme = ThemeRepo::find_by_id(pool, theme_id)
        .await?
        .filter(|t| t.is_system || t.planner_id == Some(planner_id))
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Theme",
            id: theme_id,
        }))?;
    tracing::debug!(theme_id, key = %theme.key, "Theme selected");
    Ok(())
}

/// Hash the password (when given) and insert a wedding admin.
pub(crate) async fn create_admin(
    pool: &DbPool,
    wedding_id: DbId,
    input: &CreateWeddingAdmin,
) -> AppResult<WeddingAdmin> {
    require_name(&input.name, "Admin")?;
    let email = normalize_email(&input.email);
    if !email.contains('@') {
        return Err(AppError::Core(CoreError::Validation(
            "A valid email is required".into(),
        )));
    }
    let hash = hash_new_password(input.password.as_deref())?;
    let admin = WeddingAdminRepo::create(pool, wedding_id, &email, input, hash.as_deref()).await?;
    tracing::info!(wedding_id, admin_id = admin.id, "Wedding admin added");
    Ok(admin)
}

/// GET /api/admin/wedding
pub async fn get_wedding(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Wedding>>> {
    let wedding = load_wedding(&state.pool, access.wedding_id).await?;
    Ok(Json(DataResponse { data: wedding }))
}

/// PATCH /api/admin/wedding
///
/// Update details or advance the setup wizard. Only planners may toggle
/// `is_active`.
pub async fn update_wedding(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Json(input): Json<UpdateWedding>,
) -> AppResult<Json<DataResponse<Wedding>>> {
    if input.is_active.is_some() && access.user.role != Role::Planner {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the planner can activate or deactivate a wedding".into(),
        )));
    }
    let current = load_wedding(&state.pool, access.wedding_id).await?;
    let input = prepare_update(&state.pool, current.planner_id, input).await?;

    let wedding = WeddingRepo::update(&state.pool, access.wedding_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Wedding",
            id: access.wedding_id,
        }))?;

    tracing::info!(
        wedding_id = wedding.id,
        wizard_step = wedding.wizard_step,
        "Wedding updated"
    );
    Ok(Json(DataResponse { data: wedding }))
}

/// GET /api/admin/themes
///
/// System themes plus the owning planner's custom themes.
pub async fn list_themes(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let wedding = load_wedding(&state.pool, access.wedding_id).await?;
    let themes = ThemeRepo::list_available(&state.pool, Some(wedding.planner_id)).await?;
    Ok(Json(DataResponse { data: themes }))
}

/// GET /api/admin/admins
pub async fn list_admins(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let admins = WeddingAdminRepo::list_for_wedding(&state.pool, access.wedding_id).await?;
    Ok(Json(DataResponse { data: admins }))
}

/// POST /api/admin/admins
pub async fn add_admin(
    access: RequireWeddingAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateWeddingAdmin>,
) -> AppResult<impl IntoResponse> {
    let admin = create_admin(&state.pool, access.wedding_id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: admin })))
}
