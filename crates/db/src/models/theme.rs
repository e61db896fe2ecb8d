//! Invitation themes.

use serde::Serialize;
use sqlx::FromRow;
use vowline_core::types::{DbId, Timestamp};

/// A row from the `themes` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Theme {
    pub id: DbId,
    pub key: String,
    pub name: String,
    pub is_system: bool,
    pub config: serde_json::Value,
    pub planner_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
