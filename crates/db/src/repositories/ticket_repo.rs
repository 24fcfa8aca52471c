//! Repository for the `tickets` table: door-scan validation and listing.

use gatelist_core::states::TicketStatus;
use gatelist_core::types::DbId;
use sqlx::{PgExecutor, Postgres, QueryBuilder};

use crate::models::ticket::{ScanOutcome, Ticket, TicketListQuery};

/// Column list for `tickets` queries.
pub(crate) const TICKET_COLUMNS: &str = "\
    id, order_id, order_item_id, event_id, tier_id, user_id, \
    ticket_number, scan_code, status, purchase_price_cents, \
    used_at, created_at";

/// Maximum page size for ticket listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for ticket listing.
const DEFAULT_LIMIT: i64 = 50;

pub struct TicketRepo;

impl TicketRepo {
    /// Consume an active ticket by scan code, exactly once.
    ///
    /// The accept path is a single read-check-and-update; when it returns
    /// no row a follow-up read distinguishes "no such ticket" from
    /// "already used" from "cancelled/refunded" so the door UI can show
    /// the right message. Two concurrent scans of the same code race on
    /// the update; exactly one wins.
    pub async fn validate_scan(pool: &crate::DbPool, scan_code: &str) -> Result<ScanOutcome, sqlx::Error> {
        let query = format!(
            "UPDATE tickets \
             SET status = $2, used_at = NOW() \
             WHERE scan_code = $1 AND status = $3 \
             RETURNING {TICKET_COLUMNS}"
        );
        let accepted = sqlx::query_as::<_, Ticket>(&query)
            .bind(scan_code)
            .bind(TicketStatus::Used.as_str())
            .bind(TicketStatus::Active.as_str())
            .fetch_optional(pool)
            .await?;

        if let Some(ticket) = accepted {
            return Ok(ScanOutcome {
                ticket: Some(ticket),
                is_valid: true,
                message: "Ticket valid, welcome!".into(),
            });
        }

        let existing = Self::find_by_scan_code(pool, scan_code).await?;
        Ok(match existing {
            None => ScanOutcome {
                ticket: None,
                is_valid: false,
                message: "Ticket not found".into(),
            },
            Some(ticket) => {
                let message = match TicketStatus::parse(&ticket.status) {
                    Ok(TicketStatus::Used) => "Ticket already used".to_string(),
                    Ok(TicketStatus::Cancelled) => "Ticket was cancelled".to_string(),
                    Ok(TicketStatus::Refunded) => "Ticket was refunded".to_string(),
                    // Lost a race that flipped it between our two reads,
                    // or an unknown stored status.
                    _ => "Ticket is not valid for entry".to_string(),
                };
                ScanOutcome {
                    ticket: Some(ticket),
                    is_valid: false,
                    message,
                }
            }
        })
    }

    /// Fetch a ticket by scan code.
    pub async fn find_by_scan_code<'e>(
        executor: impl PgExecutor<'e>,
        scan_code: &str,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE scan_code = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(scan_code)
            .fetch_optional(executor)
            .await
    }

    /// Paginated listing of a user's tickets with optional filters.
    ///
    /// Predicates are composed with `QueryBuilder` bindings, never by
    /// splicing request values into the SQL text.
    pub async fn list_for_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
        query: &TicketListQuery,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = query.offset.unwrap_or(0).max(0);

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE user_id = "));
        builder.push_bind(user_id);

        if let Some(status) = &query.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(event_id) = query.event_id {
            builder.push(" AND event_id = ").push_bind(event_id);
        }

        builder
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        builder.build_query_as::<Ticket>().fetch_all(executor).await
    }

    /// List all tickets minted for an order.
    pub async fn list_for_order<'e>(
        executor: impl PgExecutor<'e>,
        order_id: DbId,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query =
            format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE order_id = $1 ORDER BY id");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(order_id)
            .fetch_all(executor)
            .await
    }
}
