//! Event and ticket tier rows.
//!
//! Events are owned by the surrounding platform; the engine only reads
//! their status, capacity, and registration window. Tiers carry the
//! capacity ledger counters.

use gatelist_core::types::{Cents, DbId, Timestamp};
use gatelist_core::{pricing, CoreError};
use serde::Serialize;
use sqlx::FromRow;

/// Event status column value for an event open to the public.
pub const EVENT_STATUS_PUBLISHED: &str = "published";

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub name: String,
    pub status: String,
    pub capacity: i32,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub registration_opens_at: Timestamp,
    pub registration_closes_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Event {
    /// Whether the event accepts new orders/bookings at `now`.
    pub fn is_open_for_registration(&self, now: Timestamp) -> bool {
        self.status == EVENT_STATUS_PUBLISHED
            && now >= self.registration_opens_at
            && now <= self.registration_closes_at
    }
}

/// A row from the `ticket_tiers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketTier {
    pub id: DbId,
    pub event_id: DbId,
    pub name: String,
    pub base_price_cents: Cents,
    pub early_bird_price_cents: Option<Cents>,
    pub early_bird_end: Option<Timestamp>,
    pub max_quantity: i32,
    pub sold_quantity: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TicketTier {
    /// Remaining sellable units.
    pub fn available(&self) -> i32 {
        self.max_quantity - self.sold_quantity
    }

    /// Unit price at `now`, honouring any early-bird window.
    pub fn effective_price(&self, now: Timestamp) -> Cents {
        pricing::effective_price(
            self.base_price_cents,
            self.early_bird_price_cents,
            self.early_bird_end,
            now,
        )
    }

    /// Total for `quantity` units at `now`.
    pub fn total_for(&self, quantity: i32, now: Timestamp) -> Result<Cents, CoreError> {
        pricing::line_total(self.effective_price(now), quantity)
    }
}
