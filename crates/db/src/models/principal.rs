//! Role principals: master admins, planners and wedding admins.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vowline_core::types::{DbId, Timestamp};

/// A row from the `master_admins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MasterAdmin {
    pub id: DbId,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `wedding_planners` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Planner {
    pub id: DbId,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub enabled: bool,
    pub logo_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a planner from the master console.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanner {
    pub email: String,
    pub name: String,
    pub password: Option<String>,
    pub logo_url: Option<String>,
}

/// A row from the `wedding_admins` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WeddingAdmin {
    pub id: DbId,
    pub wedding_id: DbId,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inviting a wedding admin (usually the couple).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWeddingAdmin {
    pub email: String,
    pub name: String,
    pub password: Option<String>,
}
