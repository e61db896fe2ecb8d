//! Principal roles and role resolution.
//!
//! A signed-in email can match rows in three principal tables. Resolution
//! picks exactly one role using a fixed priority so that a person who is both
//! a planner and a wedding admin always lands in the planner console.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_MASTER_ADMIN: &str = "master_admin";
pub const ROLE_PLANNER: &str = "planner";
pub const ROLE_WEDDING_ADMIN: &str = "wedding_admin";
pub const ROLE_GUEST: &str = "guest";

/// The role attached to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    MasterAdmin,
    Planner,
    WeddingAdmin,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MasterAdmin => ROLE_MASTER_ADMIN,
            Self::Planner => ROLE_PLANNER,
            Self::WeddingAdmin => ROLE_WEDDING_ADMIN,
            Self::Guest => ROLE_GUEST,
        }
    }

    /// Parse a role string from a token or the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            ROLE_MASTER_ADMIN => Ok(Self::MasterAdmin),
            ROLE_PLANNER => Ok(Self::Planner),
            ROLE_WEDDING_ADMIN => Ok(Self::WeddingAdmin),
            ROLE_GUEST => Ok(Self::Guest),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Planner row as seen by role resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerPrincipal {
    pub id: DbId,
    pub enabled: bool,
}

/// Wedding-admin row as seen by role resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeddingAdminPrincipal {
    pub id: DbId,
    pub wedding_id: DbId,
}

/// Everything the principal tables know about one email address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrincipalLookup {
    pub master_admin: bool,
    pub planner: Option<PlannerPrincipal>,
    pub wedding_admin: Option<WeddingAdminPrincipal>,
}

/// Outcome of role resolution, copied into the session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRole {
    pub role: Role,
    pub planner_id: Option<DbId>,
    pub wedding_id: Option<DbId>,
}

/// Pick the session role for a principal lookup.
///
/// Priority is master admin, then planner, then wedding admin. A disabled
/// planner is rejected outright rather than falling through to a lower role.
pub fn resolve_role(lookup: &PrincipalLookup) -> Result<ResolvedRole, CoreError> {
    if lookup.master_admin {
        return Ok(ResolvedRole {
            role: Role::MasterAdmin,
            planner_id: None,
            wedding_id: None,
        });
    }

    if let Some(planner) = lookup.planner {
        if !planner.enabled {
            return Err(CoreError::PlannerDisabled);
        }
        return Ok(ResolvedRole {
            role: Role::Planner,
            planner_id: Some(planner.id),
            wedding_id: None,
        });
    }

    if let Some(admin) = lookup.wedding_admin {
        return Ok(ResolvedRole {
            role: Role::WeddingAdmin,
            planner_id: None,
            wedding_id: Some(admin.wedding_id),
        });
    }

    Err(CoreError::Unauthorized(
        "No account is registered for this email".into(),
    ))
}

/// Normalize an email for principal lookups (trimmed, lowercase).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
