//! Append-only audit trail for administrative actions.

use gatelist_core::audit::action_to_category;
use sqlx::PgExecutor;

use crate::models::audit::{AuditEntry, RecordAction};

const COLUMNS: &str =
    "id, action_type, category, actor_email, entity_type, entity_id, details, created_at";

pub struct AuditRepo;

impl AuditRepo {
    /// Record an administrative action. The category is derived from the
    /// action type; entries are never updated or deleted.
    pub async fn record<'e>(
        executor: impl PgExecutor<'e>,
        action: &RecordAction,
    ) -> Result<AuditEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_log \
                (action_type, category, actor_email, entity_type, entity_id, details) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEntry>(&query)
            .bind(action.action_type)
            .bind(action_to_category(action.action_type))
            .bind(&action.actor_email)
            .bind(action.entity_type)
            .bind(action.entity_id)
            .bind(&action.details)
            .fetch_one(executor)
            .await
    }
}
