//! Authenticated-principal extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use vowline_core::error::CoreError;
use vowline_core::roles::Role;
use vowline_core::session::SessionClaims;
use vowline_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// The principal behind a validated session.
///
/// Inserted into request extensions by
/// [`session_middleware`](super::session::session_middleware); handlers take it
/// as an extractor (usually through one of the [`rbac`](super::rbac) wrappers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Normalized email (`claims.sub`).
    pub email: String,
    pub role: Role,
    pub planner_id: Option<DbId>,
    pub wedding_id: Option<DbId>,
}

impl From<&SessionClaims> for AuthUser {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            email: claims.sub.clone(),
            role: claims.role,
            planner_id: claims.planner_id,
            wedding_id: claims.wedding_id,
        }
    }
}

/// Marker left by the session middleware when a bearer token was present but
/// failed validation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionRejected;

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }
        let message = if parts.extensions.get::<SessionRejected>().is_some() {
            "Invalid or expired session"
        } else {
            "Authentication required"
        };
        Err(AppError::Core(CoreError::Unauthorized(message.into())))
    }
}
