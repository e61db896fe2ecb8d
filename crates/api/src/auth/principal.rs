//! Loading the principal rows behind an email address.

use vowline_core::roles::{PlannerPrincipal, PrincipalLookup, Role, WeddingAdminPrincipal};
use vowline_core::types::DbId;
use vowline_db::models::principal::{MasterAdmin, Planner, WeddingAdmin};
use vowline_db::repositories::{MasterAdminRepo, PlannerRepo, WeddingAdminRepo};
use vowline_db::DbPool;

/// Every principal row registered under one email.
#[derive(Debug, Default)]
pub struct PrincipalRecords {
    pub master_admin: Option<MasterAdmin>,
    pub planner: Option<Planner>,
    pub wedding_admin: Option<WeddingAdmin>,
}

impl PrincipalRecords {
    /// Query the three principal tables concurrently. `email` must already be normalized.
    ///
    /// `wedding_scope` limits the wedding-admin lookup to one wedding, so an
    /// existing session keeps the tenant it was issued for.
    pub async fn load(
        pool: &DbPool,
        email: &str,
        wedding_scope: Option<DbId>,
    ) -> Result<Self, sqlx::Error> {
        let (master_admin, planner, wedding_admin) = tokio::try_join!(
            MasterAdminRepo::find_by_email(pool, email),
            PlannerRepo::find_by_email(pool, email),
            WeddingAdminRepo::find_active_by_email(pool, email, wedding_scope),
        )?;
        Ok(Self {
            master_admin,
            planner,
            wedding_admin,
        })
    }

    pub fn lookup(&self) -> PrincipalLookup {
        PrincipalLookup {
            master_admin: self.master_admin.is_some(),
            planner: self.planner.as_ref().map(|p| PlannerPrincipal {
                id: p.id,
                enabled: p.enabled,
            }),
            wedding_admin: self.wedding_admin.as_ref().map(|a| WeddingAdminPrincipal {
                id: a.id,
                wedding_id: a.wedding_id,
            }),
        }
    }

    /// Stored password hash of the row backing `role`, if that row has one.
    pub fn password_hash(&self, role: Role) -> Option<&str> {
        match role {
            Role::MasterAdmin => self.master_admin.as_ref()?.password_hash.as_deref(),
            Role::Planner => self.planner.as_ref()?.password_hash.as_deref(),
            Role::WeddingAdmin => self.wedding_admin.as_ref()?.password_hash.as_deref(),
            Role::Guest => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn planner(enabled: bool) -> Planner {
        let now = Utc::now();
        Planner {
            id: 4,
            email: "p@example.com".into(),
            name: "Pat".into(),
            password_hash: Some("$argon2id$stub".into()),
            enabled,
            logo_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn lookup_mirrors_rows() {
        let records = PrincipalRecords {
            planner: Some(planner(false)),
            ..Default::default()
        };
        let lookup = records.lookup();
        assert!(!lookup.master_admin);
        assert_eq!(lookup.planner, Some(PlannerPrincipal { id: 4, enabled: false }));
        assert_eq!(lookup.wedding_admin, None);
    }

    #[test]
    fn password_hash_follows_role() {
        let records = PrincipalRecords {
            planner: Some(planner(true)),
            ..Default::default()
        };
        assert_eq!(records.password_hash(Role::Planner), Some("$argon2id$stub"));
        assert_eq!(records.password_hash(Role::MasterAdmin), None);
        assert_eq!(records.password_hash(Role::Guest), None);
    }
}
