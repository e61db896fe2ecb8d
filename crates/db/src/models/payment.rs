//! Wedding providers (vendors) and their payments.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vowline_core::types::{Cents, DbId, Timestamp};

/// A row from the `wedding_providers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Provider {
    pub id: DbId,
    pub wedding_id: DbId,
    pub category: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub total_amount_cents: Cents,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProvider {
    pub category: String,
    pub name: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub total_amount_cents: Cents,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProvider {
    pub category: Option<String>,
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub total_amount_cents: Option<Cents>,
    pub notes: Option<String>,
}

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub wedding_id: DbId,
    pub provider_id: DbId,
    pub amount_cents: Cents,
    pub paid_at: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub method: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayment {
    pub amount_cents: Cents,
    pub paid_at: Option<Timestamp>,
    pub due_date: Option<Timestamp>,
    pub method: Option<String>,
    pub notes: Option<String>,
}
