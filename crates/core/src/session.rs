//! Session claims and the periodic role-revalidation policy.
//!
//! Session tokens carry the resolved role so most requests need no database
//! round trip. Once a token's last check is older than the revalidation
//! interval, the server re-runs role resolution and re-issues the token. A
//! planner disabled out of band is therefore locked out within one interval
//! without forcing everyone else to sign in again.

use serde::{Deserialize, Serialize};

use crate::roles::{ResolvedRole, Role};
use crate::types::DbId;

/// Default seconds between role revalidations for a live session.
pub const REVALIDATE_INTERVAL_SECS: i64 = 60;

/// The only sign-in provider implemented in-tree.
pub const PROVIDER_CREDENTIALS: &str = "credentials";

/// Claims embedded in every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the principal's normalized email.
    pub sub: String,
    /// Sign-in provider that authenticated the subject.
    pub provider: String,
    pub role: Role,
    pub wedding_id: Option<DbId>,
    pub planner_id: Option<DbId>,
    /// Issued-at (UTC Unix seconds).
    pub iat: i64,
    /// Expiration (UTC Unix seconds).
    pub exp: i64,
    /// When role resolution last ran for this session (UTC Unix seconds).
    pub checked_at: i64,
    /// Unique token identifier.
    pub jti: String,
}

impl SessionClaims {
    /// Build fresh claims for a just-resolved principal.
    pub fn issue(
        email: &str,
        provider: &str,
        resolved: ResolvedRole,
        now: i64,
        lifetime_secs: i64,
    ) -> Self {
        Self {
            sub: email.to_string(),
            provider: provider.to_string(),
            role: resolved.role,
            wedding_id: resolved.wedding_id,
            planner_id: resolved.planner_id,
            iat: now,
            exp: now + lifetime_secs,
            checked_at: now,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn resolved(&self) -> ResolvedRole {
        ResolvedRole {
            role: self.role,
            planner_id: self.planner_id,
            wedding_id: self.wedding_id,
        }
    }
}

/// Whether a session whose roles were last checked at `checked_at` must be
/// revalidated at `now`.
///
/// A `checked_at` in the future (clock skew) counts as fresh.
pub fn needs_revalidation(checked_at: i64, now: i64, interval_secs: i64) -> bool {
    now - checked_at >= interval_secs
}

/// Copy a fresh resolution into `claims` and stamp the check time.
///
/// Returns `true` when the role or its tenant scoping changed.
pub fn apply_revalidation(claims: &mut SessionClaims, resolved: ResolvedRole, now: i64) -> bool {
    let changed = claims.resolved() != resolved;
    claims.role = resolved.role;
    claims.planner_id = resolved.planner_id;
    claims.wedding_id = resolved.wedding_id;
    claims.checked_at = now;
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner_role(id: DbId) -> ResolvedRole {
        ResolvedRole {
            role: Role::Planner,
            planner_id: Some(id),
            wedding_id: None,
        }
    }

    #[test]
    fn fresh_token_does_not_need_revalidation() {
        assert!(!needs_revalidation(1_000, 1_059, REVALIDATE_INTERVAL_SECS));
    }

    #[test]
    fn token_at_interval_needs_revalidation() {
        assert!(needs_revalidation(1_000, 1_060, REVALIDATE_INTERVAL_SECS));
        assert!(needs_revalidation(1_000, 5_000, REVALIDATE_INTERVAL_SECS));
    }

    #[test]
    fn future_check_time_counts_as_fresh() {
        assert!(!needs_revalidation(2_000, 1_000, REVALIDATE_INTERVAL_SECS));
    }

    #[test]
    fn issue_sets_check_time_to_issue_time() {
        let claims = SessionClaims::issue("p@x.com", PROVIDER_CREDENTIALS, planner_role(4), 500, 3600);
        assert_eq!(claims.iat, 500);
        assert_eq!(claims.checked_at, 500);
        assert_eq!(claims.exp, 4100);
        assert_eq!(claims.planner_id, Some(4));
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn apply_revalidation_reports_changes() {
        let mut claims =
            SessionClaims::issue("p@x.com", PROVIDER_CREDENTIALS, planner_role(4), 500, 3600);

        assert!(!apply_revalidation(&mut claims, planner_role(4), 600));
        assert_eq!(claims.checked_at, 600);

        let demoted = ResolvedRole {
            role: Role::WeddingAdmin,
            planner_id: None,
            wedding_id: Some(9),
        };
        assert!(apply_revalidation(&mut claims, demoted, 700));
        assert_eq!(claims.role, Role::WeddingAdmin);
        assert_eq!(claims.wedding_id, Some(9));
        assert_eq!(claims.planner_id, None);
        assert_eq!(claims.iat, 500, "issue time is preserved");
    }
}
