//! The capacity ledger: atomic reserve/release on `ticket_tiers`.
//!
//! `sold_quantity` may only be mutated through this module. The reserve
//! path collapses the availability check and the increment into a single
//! `UPDATE ... WHERE sold_quantity + n <= max_quantity` statement, so two
//! concurrent reservations can never both observe stale availability:
//! Postgres row-locks the tier for the duration of the update and
//! re-evaluates the predicate after the lock is acquired. Lock scope is
//! one tier row; unrelated tiers are never serialized against each other.

use gatelist_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::event::TicketTier;

/// Column list for `ticket_tiers` queries.
pub(crate) const COLUMNS: &str = "\
    id, event_id, name, base_price_cents, early_bird_price_cents, \
    early_bird_end, max_quantity, sold_quantity, is_active, \
    created_at, updated_at";

pub struct TierRepo;

impl TierRepo {
    /// Fetch a tier by id.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        tier_id: DbId,
    ) -> Result<Option<TicketTier>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ticket_tiers WHERE id = $1");
        sqlx::query_as::<_, TicketTier>(&query)
            .bind(tier_id)
            .fetch_optional(executor)
            .await
    }

    /// Atomically reserve `quantity` units of a tier.
    ///
    /// Returns the updated tier row on success. `None` means the
    /// reservation did not happen: the tier is missing, inactive, or has
    /// insufficient remaining capacity; the caller distinguishes those
    /// with a follow-up [`find_by_id`](Self::find_by_id).
    ///
    /// Passing a transaction executor makes the reservation part of that
    /// transaction; a rollback undoes the increment.
    pub async fn reserve<'e>(
        executor: impl PgExecutor<'e>,
        tier_id: DbId,
        quantity: i32,
    ) -> Result<Option<TicketTier>, sqlx::Error> {
        let query = format!(
            "UPDATE ticket_tiers \
             SET sold_quantity = sold_quantity + $2, updated_at = NOW() \
             WHERE id = $1 \
               AND is_active \
               AND sold_quantity + $2 <= max_quantity \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TicketTier>(&query)
            .bind(tier_id)
            .bind(quantity)
            .fetch_optional(executor)
            .await
    }

    /// Return previously reserved units, e.g. when a booking is cancelled.
    ///
    /// Floored at zero so a stray double-release can never drive the
    /// counter negative.
    pub async fn release<'e>(
        executor: impl PgExecutor<'e>,
        tier_id: DbId,
        quantity: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE ticket_tiers \
             SET sold_quantity = GREATEST(sold_quantity - $2, 0), updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(tier_id)
        .bind(quantity)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// List the tiers of an event, active first.
    pub async fn list_for_event<'e>(
        executor: impl PgExecutor<'e>,
        event_id: DbId,
    ) -> Result<Vec<TicketTier>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ticket_tiers \
             WHERE event_id = $1 \
             ORDER BY is_active DESC, base_price_cents ASC"
        );
        sqlx::query_as::<_, TicketTier>(&query)
            .bind(event_id)
            .fetch_all(executor)
            .await
    }
}
