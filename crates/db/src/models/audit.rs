//! Audit log models.

use gatelist_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `audit_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEntry {
    pub id: DbId,
    pub action_type: String,
    pub category: String,
    pub actor_email: String,
    pub entity_type: String,
    pub entity_id: DbId,
    pub details: serde_json::Value,
    pub created_at: Timestamp,
}

/// Fields for a new audit entry; the category is derived from the action.
#[derive(Debug)]
pub struct RecordAction {
    pub action_type: &'static str,
    pub actor_email: String,
    pub entity_type: &'static str,
    pub entity_id: DbId,
    pub details: serde_json::Value,
}
