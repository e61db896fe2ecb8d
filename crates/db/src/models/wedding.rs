//! Wedding entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vowline_core::types::{DbId, Timestamp};

/// A row from the `weddings` table. The tenant root.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Wedding {
    pub id: DbId,
    pub planner_id: DbId,
    pub couple_names: String,
    pub wedding_date: NaiveDate,
    pub wedding_time: String,
    pub location: String,
    pub venue_address: Option<String>,
    pub default_language: String,
    pub rsvp_cutoff_date: Option<Timestamp>,
    pub is_active: bool,
    pub theme_id: Option<DbId>,
    pub dress_code: Option<String>,
    pub additional_info: Option<String>,
    pub wizard_step: i32,
    pub wizard_completed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a wedding. The owning planner comes from the session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWedding {
    pub couple_names: String,
    pub wedding_date: NaiveDate,
    pub wedding_time: Option<String>,
    pub location: Option<String>,
    pub venue_address: Option<String>,
    pub default_language: Option<String>,
    pub rsvp_cutoff_date: Option<Timestamp>,
    pub theme_id: Option<DbId>,
}

/// DTO for updating a wedding. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWedding {
    pub couple_names: Option<String>,
    pub wedding_date: Option<NaiveDate>,
    pub wedding_time: Option<String>,
    pub location: Option<String>,
    pub venue_address: Option<String>,
    pub default_language: Option<String>,
    pub rsvp_cutoff_date: Option<Timestamp>,
    pub theme_id: Option<DbId>,
    pub dress_code: Option<String>,
    pub additional_info: Option<String>,
    pub wizard_step: Option<i32>,
    pub wizard_completed: Option<bool>,
    pub is_active: Option<bool>,
}

/// Guest response counts for one wedding, used by the planner dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WeddingGuestCounts {
    pub wedding_id: DbId,
    pub couple_names: String,
    pub wedding_date: NaiveDate,
    pub families: i64,
    pub families_responded: i64,
    pub members: i64,
    pub members_attending: i64,
}
