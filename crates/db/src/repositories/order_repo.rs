//! Repository for `orders`, `order_items`, and ticket minting.
//!
//! Order creation and completion are the two multi-step transactions of
//! the cart path. Creation reserves every line's capacity sequentially
//! inside one transaction, so a failure on line *k* rolls back the
//! reservations for lines *1..k-1*. Completion locks the order row,
//! enforces the `pending` guard, and mints one ticket per purchased unit
//! in the same transaction, so a retry after any partial failure starts
//! from a clean slate.

use chrono::Utc;
use gatelist_core::codes;
use gatelist_core::states::{PaymentAction, PaymentStatus, TicketStatus};
use gatelist_core::types::{Cents, DbId};
use gatelist_core::CoreError;
use sqlx::PgExecutor;

use crate::models::event::TicketTier;
use crate::models::order::{CreateOrder, Order, OrderItem, OrderWithItems};
use crate::models::ticket::Ticket;
use crate::repositories::ticket_repo::TICKET_COLUMNS;
use crate::repositories::{internal, EventRepo, TierRepo};
use crate::DbPool;

/// Column list for `orders` queries.
const COLUMNS: &str = "\
    id, user_id, event_id, total_amount_cents, payment_status, \
    payment_reference, created_at, updated_at";

/// Column list for `order_items` queries.
const ITEM_COLUMNS: &str = "id, order_id, tier_id, quantity, unit_price_cents, line_total_cents";

pub struct OrderRepo;

impl OrderRepo {
    /// Create a pending order with per-item price snapshots.
    ///
    /// All items are reserved sequentially within one transaction; the
    /// whole order fails if any item cannot be reserved.
    pub async fn create(pool: &DbPool, input: &CreateOrder) -> Result<OrderWithItems, CoreError> {
        let mut tx = pool.begin().await.map_err(internal)?;
        let now = Utc::now();

        let event = EventRepo::find_by_id(&mut *tx, input.event_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| CoreError::not_found("Event", input.event_id))?;
        if !event.is_open_for_registration(now) {
            return Err(CoreError::FailedPrecondition(format!(
                "event {} is not open for registration",
                event.name
            )));
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (user_id, event_id, total_amount_cents, payment_status) \
             VALUES ($1, $2, 0, $3) \
             RETURNING {COLUMNS}"
        ))
        .bind(input.user_id)
        .bind(input.event_id)
        .bind(PaymentStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;

        let mut items = Vec::with_capacity(input.items.len());
        let mut total: Cents = 0;

        for line in &input.items {
            let tier = Self::reserve_line(&mut *tx, input.event_id, line.tier_id, line.quantity)
                .await?;

            let unit_price = tier.effective_price(now);
            let line_total = tier.total_for(line.quantity, now)?;
            total = total
                .checked_add(line_total)
                .ok_or_else(|| CoreError::Internal("order total overflow".into()))?;

            let item = sqlx::query_as::<_, OrderItem>(&format!(
                "INSERT INTO order_items \
                    (order_id, tier_id, quantity, unit_price_cents, line_total_cents) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {ITEM_COLUMNS}"
            ))
            .bind(order.id)
            .bind(line.tier_id)
            .bind(line.quantity)
            .bind(unit_price)
            .bind(line_total)
            .fetch_one(&mut *tx)
            .await
            .map_err(internal)?;
            items.push(item);
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET total_amount_cents = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(order.id)
        .bind(total)
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;

        tx.commit().await.map_err(internal)?;
        Ok(OrderWithItems { order, items })
    }

    /// Reserve one order line, translating a missed reservation into the
    /// precise domain error.
    async fn reserve_line(
        tx: &mut sqlx::PgConnection,
        event_id: DbId,
        tier_id: DbId,
        quantity: i32,
    ) -> Result<TicketTier, CoreError> {
        if let Some(tier) = TierRepo::reserve(&mut *tx, tier_id, quantity)
            .await
            .map_err(internal)?
        {
            if tier.event_id != event_id {
                return Err(CoreError::not_found("TicketTier", tier_id));
            }
            return Ok(tier);
        }

        Err(
            match TierRepo::find_by_id(&mut *tx, tier_id).await.map_err(internal)? {
                None => CoreError::not_found("TicketTier", tier_id),
                Some(t) if !t.is_active => {
                    CoreError::FailedPrecondition(format!("tier {} is not on sale", t.name))
                }
                Some(t) => CoreError::ResourceExhausted(format!(
                    "Only {} tickets available for {}",
                    t.available(),
                    t.name
                )),
            },
        )
    }

    /// Complete a pending order and mint its tickets.
    ///
    /// The order row is locked with `FOR UPDATE` before the status guard,
    /// so two concurrent completions serialize and the loser observes a
    /// non-pending order (`FailedPrecondition`) instead of double-minting.
    /// Ticket numbers are derived from `(order_id, unit index)`, making the
    /// minted set deterministic for a given order.
    pub async fn complete(
        pool: &DbPool,
        order_id: DbId,
        payment_reference: &str,
    ) -> Result<(Order, Vec<Ticket>), CoreError> {
        let mut tx = pool.begin().await.map_err(internal)?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(internal)?
        .ok_or_else(|| CoreError::not_found("Order", order_id))?;

        // The state machine is the idempotency guard: completing anything
        // but a pending order is rejected without touching tickets.
        PaymentStatus::parse(&order.payment_status)?.transition(PaymentAction::Complete)?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders \
             SET payment_status = $2, payment_reference = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(order_id)
        .bind(PaymentStatus::Completed.as_str())
        .bind(payment_reference)
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;

        let items = Self::items_for_order(&mut *tx, order_id).await.map_err(internal)?;

        let mut tickets = Vec::new();
        let mut unit_index: u32 = 0;
        for item in &items {
            for _ in 0..item.quantity {
                unit_index += 1;
                let ticket = sqlx::query_as::<_, Ticket>(&format!(
                    "INSERT INTO tickets \
                        (order_id, order_item_id, event_id, tier_id, user_id, \
                         ticket_number, scan_code, status, purchase_price_cents) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
                     RETURNING {TICKET_COLUMNS}"
                ))
                .bind(order.id)
                .bind(item.id)
                .bind(order.event_id)
                .bind(item.tier_id)
                .bind(order.user_id)
                .bind(codes::ticket_number(order.id, unit_index))
                .bind(codes::generate_scan_code())
                .bind(TicketStatus::Active.as_str())
                .bind(item.unit_price_cents)
                .fetch_one(&mut *tx)
                .await
                .map_err(internal)?;
                tickets.push(ticket);
            }
        }

        tx.commit().await.map_err(internal)?;
        Ok((order, tickets))
    }

    /// Refund a completed order: tickets are voided and every line's
    /// capacity returns to its tier.
    ///
    /// Uses the same `FOR UPDATE` + state machine guard as [`complete`],
    /// so a refund can never race a completion or another refund.
    /// Already-used tickets stay `used`; only active ones flip to
    /// `refunded`.
    ///
    /// [`complete`]: OrderRepo::complete
    pub async fn refund(pool: &DbPool, order_id: DbId) -> Result<(Order, u64), CoreError> {
        let mut tx = pool.begin().await.map_err(internal)?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(internal)?
        .ok_or_else(|| CoreError::not_found("Order", order_id))?;

        PaymentStatus::parse(&order.payment_status)?.transition(PaymentAction::Refund)?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET payment_status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(order_id)
        .bind(PaymentStatus::Refunded.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;

        let refunded_tickets = sqlx::query(
            "UPDATE tickets SET status = $2 WHERE order_id = $1 AND status = $3",
        )
        .bind(order_id)
        .bind(TicketStatus::Refunded.as_str())
        .bind(TicketStatus::Active.as_str())
        .execute(&mut *tx)
        .await
        .map_err(internal)?
        .rows_affected();

        let items = Self::items_for_order(&mut *tx, order_id).await.map_err(internal)?;
        for item in &items {
            TierRepo::release(&mut *tx, item.tier_id, item.quantity)
                .await
                .map_err(internal)?;
        }

        tx.commit().await.map_err(internal)?;
        Ok((order, refunded_tickets))
    }

    /// Fetch an order by id.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        order_id: DbId,
    ) -> Result<Option<Order>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, Order>(&query)
            .bind(order_id)
            .fetch_optional(executor)
            .await
    }

    /// List an order's items.
    pub async fn items_for_order<'e>(
        executor: impl PgExecutor<'e>,
        order_id: DbId,
    ) -> Result<Vec<OrderItem>, sqlx::Error> {
        let query =
            format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id");
        sqlx::query_as::<_, OrderItem>(&query)
            .bind(order_id)
            .fetch_all(executor)
            .await
    }
}
