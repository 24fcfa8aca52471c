//! Ticket models and the scan-validation response shape.

use gatelist_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub order_id: DbId,
    pub order_item_id: DbId,
    pub event_id: DbId,
    pub tier_id: DbId,
    pub user_id: DbId,
    pub ticket_number: String,
    pub scan_code: String,
    pub status: String,
    pub purchase_price_cents: Cents,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Query parameters for `GET /tickets/users/{user_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct TicketListQuery {
    /// Filter by ticket status (e.g. `active`, `used`).
    pub status: Option<String>,
    /// Filter by event.
    pub event_id: Option<DbId>,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

/// Outcome of validating a scan code at the door.
///
/// `ticket` is present whenever a matching ticket exists, regardless of
/// whether the scan was accepted, so door UIs can show the holder's
/// details alongside the rejection message.
#[derive(Debug, Serialize)]
pub struct ScanOutcome {
    pub ticket: Option<Ticket>,
    pub is_valid: bool,
    pub message: String,
}
