//! Handlers for `/auth` (credential sign-in and session introspection).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use vowline_core::error::CoreError;
use vowline_core::roles::{normalize_email, resolve_role, Role};
use vowline_core::session::PROVIDER_CREDENTIALS;
use vowline_core::types::DbId;
use vowline_db::repositories::WeddingAdminRepo;

use crate::auth::jwt::issue_session;
use crate::auth::password::verify_password;
use crate::auth::principal::PrincipalRecords;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/sign-in`.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub email: String,
    pub role: Role,
    pub planner_id: Option<DbId>,
    pub wedding_id: Option<DbId>,
}

impl From<&AuthUser> for SessionView {
    fn from(user: &AuthUser) -> Self {
        Self {
            email: user.email.clone(),
            role: user.role,
            planner_id: user.planner_id,
            wedding_id: user.wedding_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub token: String,
    /// Expiry as a UTC Unix timestamp.
    pub expires_at: i64,
    pub session: SessionView,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/sign-in
///
/// Authenticate with email + password against whichever principal the email
/// resolves to (master admin, then planner, then wedding admin).
pub async fn sign_in(
    State(state): State<AppState>,
    Json(input): Json<SignInRequest>,
) -> AppResult<Json<DataResponse<SignInResponse>>> {
    let email = normalize_email(&input.email);
    let records = PrincipalRecords::load(&state.pool, &email, None).await?;
    let resolved = resolve_role(&records.lookup());

    // A disabled planner still proves their password before learning the
    // account is disabled.
    let password_role = match &resolved {
        Ok(r) => r.role,
        Err(CoreError::PlannerDisabled) => Role::Planner,
        Err(_) => return Err(invalid_credentials()),
    };
    let hash = records
        .password_hash(password_role)
        .ok_or_else(invalid_credentials)?;
    let valid = verify_password(&input.password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        tracing::info!(email = %email, "Failed sign-in");
        return Err(invalid_credentials());
    }

    let resolved = resolved?;
    if let (Role::WeddingAdmin, Some(admin)) = (resolved.role, &records.wedding_admin) {
        WeddingAdminRepo::touch_last_login(&state.pool, admin.id).await?;
    }

    let (token, claims) = issue_session(&email, PROVIDER_CREDENTIALS, resolved, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Session signing failed: {e}")))?;

    tracing::info!(email = %email, role = %claims.role, "Signed in");

    let user = AuthUser::from(&claims);
    Ok(Json(DataResponse {
        data: SignInResponse {
            token,
            expires_at: claims.exp,
            session: SessionView::from(&user),
        },
    }))
}

/// GET /api/auth/session
///
/// The caller's current session. A refreshed token, if any, arrives in the
/// `x-session-token` header.
pub async fn session(RequireAuth(user): RequireAuth) -> Json<DataResponse<SessionView>> {
    Json(DataResponse {
        data: SessionView::from(&user),
    })
}
