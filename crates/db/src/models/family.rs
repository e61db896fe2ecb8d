//! Guest families and their members.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vowline_core::types::{DbId, Timestamp};

/// A row from the `families` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Family {
    pub id: DbId,
    pub wedding_id: DbId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp_number: Option<String>,
    pub magic_token: String,
    pub preferred_language: String,
    pub channel_preference: Option<String>,
    pub invited_by_admin_id: Option<DbId>,
    pub rsvp_submitted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a family. The magic token is generated by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFamily {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp_number: Option<String>,
    pub preferred_language: Option<String>,
    pub channel_preference: Option<String>,
    #[serde(default)]
    pub members: Vec<CreateFamilyMember>,
}

/// DTO for updating a family. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFamily {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp_number: Option<String>,
    pub preferred_language: Option<String>,
    pub channel_preference: Option<String>,
}

/// A row from the `family_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FamilyMember {
    pub id: DbId,
    pub family_id: DbId,
    pub name: String,
    pub member_type: String,
    pub age: Option<i32>,
    pub attending: Option<bool>,
    pub dietary_restrictions: Option<String>,
    pub accessibility_needs: Option<String>,
    pub added_by_guest: bool,
    pub table_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a member to a family.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFamilyMember {
    pub name: String,
    /// `ADULT`, `CHILD` or `INFANT`. Defaults to `ADULT`.
    pub member_type: Option<String>,
    pub age: Option<i32>,
    pub dietary_restrictions: Option<String>,
    pub accessibility_needs: Option<String>,
}

/// DTO for editing a member from the admin console.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFamilyMember {
    pub name: Option<String>,
    pub member_type: Option<String>,
    pub age: Option<i32>,
    pub dietary_restrictions: Option<String>,
    pub accessibility_needs: Option<String>,
}

/// A family with its members, as returned by guest and admin reads.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyWithMembers {
    #[serde(flatten)]
    pub family: Family,
    pub members: Vec<FamilyMember>,
}
