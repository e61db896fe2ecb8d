//! Seating tables.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vowline_core::types::{DbId, Timestamp};

/// A row from the `tables` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeatingTable {
    pub id: DbId,
    pub wedding_id: DbId,
    pub name: String,
    pub capacity: i32,
    pub number: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTable {
    pub name: String,
    pub capacity: i32,
    pub number: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTable {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub number: Option<i32>,
}
