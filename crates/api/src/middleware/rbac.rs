//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! match. Missing or invalid sessions are 401; a valid session with the wrong
//! role is 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use vowline_core::error::CoreError;
use vowline_core::roles::Role;
use vowline_core::types::DbId;
use vowline_db::repositories::WeddingRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Header a planner sends to act on one of their weddings through `/api/admin`.
pub const WEDDING_ID_HEADER: &str = "x-wedding-id";

/// Requires any authenticated principal.
///
/// ```ignore
/// async fn any_authed(RequireAuth(user): RequireAuth) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}

/// Requires the `master_admin` role.
pub struct RequireMasterAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireMasterAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != Role::MasterAdmin {
            return Err(AppError::Core(CoreError::Forbidden(
                "Master admin role required".into(),
            )));
        }
        Ok(RequireMasterAdmin(user))
    }
}

/// Requires the `planner` role; carries the planner's id.
pub struct RequirePlanner {
    pub user: AuthUser,
    pub planner_id: DbId,
}

impl FromRequestParts<AppState> for RequirePlanner {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        match (user.role, user.planner_id) {
            (Role::Planner, Some(planner_id)) => Ok(RequirePlanner { user, planner_id }),
            _ => Err(AppError::Core(CoreError::Forbidden(
                "Planner role required".into(),
            ))),
        }
    }
}

/// Requires access to one wedding's admin console; carries that wedding's id.
///
/// Wedding admins are scoped to the wedding in their session. Planners pick
/// one of their own weddings with the `x-wedding-id` header; a wedding they
/// do not own is reported as not found.
pub struct RequireWeddingAdmin {
    pub user: AuthUser,
    pub wedding_id: DbId,
}

impl FromRequestParts<AppState> for RequireWeddingAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        match (user.role, user.wedding_id, user.planner_id) {
            (Role::WeddingAdmin, Some(wedding_id), _) => Ok(RequireWeddingAdmin { user, wedding_id }),
            (Role::Planner, _, Some(planner_id)) => {
                let wedding_id = requested_wedding(parts)?;
                WeddingRepo::find_for_planner(&state.pool, wedding_id, planner_id)
                    .await?
                    .ok_or(AppError::Core(CoreError::NotFound {
                        entity: "Wedding",
                        id: wedding_id,
                    }))?;
                Ok(RequireWeddingAdmin { user, wedding_id })
            }
            _ => Err(AppError::Core(CoreError::Forbidden(
                "Wedding admin or planner role required".into(),
            ))),
        }
    }
}

fn requested_wedding(parts: &Parts) -> Result<DbId, AppError> {
    let raw = parts
        .headers
        .get(WEDDING_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::BadRequest(format!("The {WEDDING_ID_HEADER} header is required"))
        })?;
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {WEDDING_ID_HEADER} header: '{raw}'")))
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/admin/guests");
        if let Some(value) = header {
            builder = builder.header(WEDDING_ID_HEADER, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn wedding_header_is_parsed() {
        assert_eq!(requested_wedding(&parts_with(Some(" 42 "))).unwrap(), 42);
    }

    #[test]
    fn missing_or_bad_wedding_header_is_bad_request() {
        assert!(matches!(
            requested_wedding(&parts_with(None)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            requested_wedding(&parts_with(Some("abc"))),
            Err(AppError::BadRequest(_))
        ));
    }
}
