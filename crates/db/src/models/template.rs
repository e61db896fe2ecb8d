//! Invitation (block) templates and message templates.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vowline_core::types::{DbId, Timestamp};

/// A row from the `invitation_templates` table. `blocks` holds the
/// serialized `vowline_core::invitation::Block` list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InvitationTemplate {
    pub id: DbId,
    pub wedding_id: DbId,
    pub name: String,
    pub blocks: serde_json::Value,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvitationTemplate {
    pub name: String,
    pub blocks: serde_json::Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInvitationTemplate {
    pub name: Option<String>,
    pub blocks: Option<serde_json::Value>,
}

/// A row from the `message_templates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageTemplateRow {
    pub id: DbId,
    pub wedding_id: DbId,
    pub template_type: String,
    pub language: String,
    pub channel: String,
    pub subject: Option<String>,
    pub body: String,
    pub content_sid: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or replacing the template in one
/// `(type, language, channel)` slot.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertMessageTemplate {
    pub template_type: String,
    pub language: String,
    pub channel: String,
    pub subject: Option<String>,
    pub body: String,
    pub content_sid: Option<String>,
}
