//! Short RSVP links.

use serde::Serialize;
use sqlx::FromRow;
use vowline_core::types::{DbId, Timestamp};

/// A row from the `short_urls` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShortUrl {
    pub id: DbId,
    pub code: String,
    pub family_id: DbId,
    pub created_at: Timestamp,
}
