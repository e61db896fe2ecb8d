//! Session validation and periodic role revalidation.
//!
//! Every `/api` request passes through [`session_middleware`]. A request
//! without a bearer token continues anonymously. A valid token whose roles
//! were last checked more than `SESSION_REVALIDATE_SECS` ago is re-resolved
//! against the principal tables; the re-signed token is returned in the
//! `x-session-token` response header and clients replace their copy with it.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use vowline_core::roles::resolve_role;
use vowline_core::session::{apply_revalidation, needs_revalidation, SessionClaims};

use super::auth::{AuthUser, SessionRejected};
use crate::auth::jwt::{encode_session, validate_session};
use crate::auth::principal::PrincipalRecords;
use crate::error::AppError;
use crate::state::AppState;

/// Response header carrying a re-signed session token.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        return next.run(request).await;
    };

    let claims = match validate_session(token, &state.config.jwt) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token");
            request.extensions_mut().insert(SessionRejected);
            return next.run(request).await;
        }
    };

    let now = chrono::Utc::now().timestamp();
    let (claims, refreshed) =
        if needs_revalidation(claims.checked_at, now, state.config.jwt.revalidate_secs) {
            match revalidate(&state, claims, now).await {
                Ok((claims, token)) => (claims, Some(token)),
                Err(e) => return e.into_response(),
            }
        } else {
            (claims, None)
        };

    request.extensions_mut().insert(AuthUser::from(&claims));
    let mut response = next.run(request).await;

    if let Some(value) = refreshed.and_then(|t| HeaderValue::from_str(&t).ok()) {
        response.headers_mut().insert(SESSION_TOKEN_HEADER, value);
    }
    response
}

/// Re-run role resolution for `claims.sub` and re-sign the session.
///
/// A wedding-admin session is only revalidated against the wedding it names.
/// Disabled planners get `PLANNER_DISABLED` and principals that no longer
/// exist get 401, ending the session in both cases.
async fn revalidate(
    state: &AppState,
    mut claims: SessionClaims,
    now: i64,
) -> Result<(SessionClaims, String), AppError> {
    let records = PrincipalRecords::load(&state.pool, &claims.sub, claims.wedding_id).await?;
    let resolved = resolve_role(&records.lookup()).inspect_err(|e| {
        tracing::info!(email = %claims.sub, error = %e, "Session revoked on revalidation");
    })?;

    if apply_revalidation(&mut claims, resolved, now) {
        tracing::info!(email = %claims.sub, role = %claims.role, "Session role changed");
    }

    let token = encode_session(&claims, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Session signing failed: {e}")))?;
    Ok((claims, token))
}

#[cfg(test)]
mod tests {
    use axum::http::header::AUTHORIZATION;

    use super::*;

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));
    }
}
