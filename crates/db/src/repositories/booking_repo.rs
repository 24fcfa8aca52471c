//! Repository for the `bookings` table: the quick single-tier purchase
//! transaction and the booking-code check-in flip.

use chrono::Utc;
use gatelist_core::codes::{self, CODE_COLLISION_RETRIES};
use gatelist_core::states::BookingStatus;
use gatelist_core::types::DbId;
use gatelist_core::CoreError;
use sqlx::PgExecutor;

use crate::models::booking::{Booking, BookingDetails, CreateBooking};
use crate::repositories::{internal, is_unique_violation, TierRepo};
use crate::DbPool;

/// Column list for `bookings` queries.
const COLUMNS: &str = "\
    id, event_id, tier_id, quantity, customer_email, customer_name, \
    total_amount_cents, booking_code, status, checked_in_at, \
    created_at, updated_at";

pub struct BookingRepo;

impl BookingRepo {
    /// Create a confirmed booking, reserving tier capacity atomically.
    ///
    /// The reservation, pricing, and insert run in one transaction: if any
    /// step fails the reservation is rolled back with it. A booking-code
    /// unique collision is retried internally with a fresh code up to
    /// [`CODE_COLLISION_RETRIES`] times before surfacing as `Internal`.
    pub async fn create_confirmed(
        pool: &DbPool,
        input: &CreateBooking,
    ) -> Result<Booking, CoreError> {
        let candidates =
            (0..CODE_COLLISION_RETRIES).map(|_| codes::generate_booking_code());
        Self::create_with_codes(pool, input, candidates).await
    }

    /// Collision-retry loop over a fixed sequence of candidate codes.
    ///
    /// Every unique violation on the booking code, including on the last
    /// candidate, retries or falls through to `Internal`; `AlreadyExists`
    /// is never surfaced for a code collision.
    async fn create_with_codes(
        pool: &DbPool,
        input: &CreateBooking,
        candidates: impl Iterator<Item = String>,
    ) -> Result<Booking, CoreError> {
        for (attempt, code) in candidates.enumerate() {
            match Self::try_create(pool, input, &code).await {
                Err(CoreError::AlreadyExists(_)) => {
                    tracing::warn!(attempt = attempt + 1, code, "Booking code collision, retrying");
                }
                other => return other,
            }
        }
        Err(CoreError::Internal(
            "could not allocate a unique booking code".into(),
        ))
    }

    async fn try_create(
        pool: &DbPool,
        input: &CreateBooking,
        booking_code: &str,
    ) -> Result<Booking, CoreError> {
        let mut tx = pool.begin().await.map_err(internal)?;

        // Reserve first: the single-statement update row-locks the tier
        // and rules out oversell under any interleaving.
        let tier = TierRepo::reserve(&mut *tx, input.ticket_tier_id, input.quantity)
            .await
            .map_err(internal)?;

        let tier = match tier {
            Some(tier) => tier,
            // Dropping `tx` rolls back; nothing was reserved.
            None => return Err(Self::reservation_failure(&mut *tx, input).await?),
        };

        if tier.event_id != input.event_id {
            return Err(CoreError::not_found("TicketTier", input.ticket_tier_id));
        }

        let total = tier.total_for(input.quantity, Utc::now())?;

        let query = format!(
            "INSERT INTO bookings \
                (event_id, tier_id, quantity, customer_email, customer_name, \
                 total_amount_cents, booking_code, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(input.event_id)
            .bind(input.ticket_tier_id)
            .bind(input.quantity)
            .bind(&input.customer_email)
            .bind(&input.customer_name)
            .bind(total)
            .bind(booking_code)
            .bind(BookingStatus::Confirmed.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e, "uq_bookings_code") {
                    CoreError::AlreadyExists(format!("booking code {booking_code}"))
                } else {
                    internal(e)
                }
            })?;

        tx.commit().await.map_err(internal)?;
        Ok(booking)
    }

    /// Explain why [`TierRepo::reserve`] returned no row.
    async fn reservation_failure(
        tx: &mut sqlx::PgConnection,
        input: &CreateBooking,
    ) -> Result<CoreError, CoreError> {
        let tier = TierRepo::find_by_id(&mut *tx, input.ticket_tier_id)
            .await
            .map_err(internal)?;
        Ok(match tier {
            None => CoreError::not_found("TicketTier", input.ticket_tier_id),
            Some(t) if !t.is_active => {
                CoreError::FailedPrecondition(format!("tier {} is not on sale", t.name))
            }
            Some(t) => CoreError::ResourceExhausted(format!(
                "Only {} tickets available for {}",
                t.available(),
                t.name
            )),
        })
    }

    /// Fetch a booking by its shareable code.
    pub async fn find_by_code<'e>(
        executor: impl PgExecutor<'e>,
        booking_code: &str,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bookings WHERE booking_code = $1");
        sqlx::query_as::<_, Booking>(&query)
            .bind(booking_code)
            .fetch_optional(executor)
            .await
    }

    /// Booking joined with event/tier display fields.
    pub async fn find_details_by_code<'e>(
        executor: impl PgExecutor<'e>,
        booking_code: &str,
    ) -> Result<Option<BookingDetails>, sqlx::Error> {
        sqlx::query_as::<_, BookingDetails>(
            "SELECT b.id, b.booking_code, b.status, b.quantity, \
                    b.customer_email, b.customer_name, b.total_amount_cents, \
                    b.checked_in_at, b.created_at, \
                    e.name AS event_name, e.starts_at AS event_starts_at, \
                    t.name AS tier_name \
             FROM bookings b \
             JOIN events e ON e.id = b.event_id \
             JOIN ticket_tiers t ON t.id = b.tier_id \
             WHERE b.booking_code = $1",
        )
        .bind(booking_code)
        .fetch_optional(executor)
        .await
    }

    /// Flip a confirmed booking to checked-in, exactly once.
    ///
    /// A single read-check-and-update statement: `None` means the code
    /// does not exist, the booking is not confirmed, or a concurrent
    /// check-in won the race; all reported the same way to the caller.
    pub async fn check_in<'e>(
        executor: impl PgExecutor<'e>,
        booking_code: &str,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let query = format!(
            "UPDATE bookings \
             SET status = $2, checked_in_at = NOW(), updated_at = NOW() \
             WHERE booking_code = $1 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Booking>(&query)
            .bind(booking_code)
            .bind(BookingStatus::CheckedIn.as_str())
            .bind(BookingStatus::Confirmed.as_str())
            .fetch_optional(executor)
            .await
    }

    /// Cancel a booking and return its capacity to the tier.
    ///
    /// Legal only from `pending`/`confirmed`; the status guard is in the
    /// update predicate so a concurrent check-in cannot be clobbered.
    pub async fn cancel(pool: &DbPool, booking_code: &str) -> Result<Booking, CoreError> {
        let mut tx = pool.begin().await.map_err(internal)?;

        let query = format!(
            "UPDATE bookings \
             SET status = $2, updated_at = NOW() \
             WHERE booking_code = $1 AND status IN ($3, $4) \
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(booking_code)
            .bind(BookingStatus::Cancelled.as_str())
            .bind(BookingStatus::Pending.as_str())
            .bind(BookingStatus::Confirmed.as_str())
            .fetch_optional(&mut *tx)
            .await
            .map_err(internal)?;

        let booking = match booking {
            Some(b) => b,
            None => {
                return Err(match Self::find_by_code(&mut *tx, booking_code)
                    .await
                    .map_err(internal)?
                {
                    None => CoreError::not_found("Booking", booking_code),
                    Some(b) => CoreError::FailedPrecondition(format!(
                        "cannot cancel a {} booking",
                        b.status
                    )),
                });
            }
        };

        TierRepo::release(&mut *tx, booking.tier_id, booking.quantity)
            .await
            .map_err(internal)?;

        tx.commit().await.map_err(internal)?;
        Ok(booking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    async fn seed_tier(pool: &DbPool) -> (DbId, DbId) {
        let event_id: DbId = sqlx::query_scalar(
            "INSERT INTO events \
                (name, status, capacity, starts_at, ends_at, \
                 registration_opens_at, registration_closes_at) \
             VALUES ('Test Conf', 'published', 1000, \
                     NOW() + INTERVAL '7 days', NOW() + INTERVAL '8 days', \
                     NOW() - INTERVAL '1 day', NOW() + INTERVAL '6 days') \
             RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        let tier_id: DbId = sqlx::query_scalar(
            "INSERT INTO ticket_tiers \
                (event_id, name, base_price_cents, max_quantity) \
             VALUES ($1, 'GA', 5000, 100) \
             RETURNING id",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await
        .unwrap();
        (event_id, tier_id)
    }

    fn booking_request(event_id: DbId, tier_id: DbId) -> CreateBooking {
        CreateBooking {
            event_id,
            ticket_tier_id: tier_id,
            quantity: 1,
            customer_email: "ada@example.com".into(),
            customer_name: "Ada Lovelace".into(),
        }
    }

    async fn sold_quantity(pool: &DbPool, tier_id: DbId) -> i32 {
        sqlx::query_scalar("SELECT sold_quantity FROM ticket_tiers WHERE id = $1")
            .bind(tier_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "../../db/migrations")]
    async fn exhausted_code_collisions_surface_as_internal(pool: DbPool) {
        let (event_id, tier_id) = seed_tier(&pool).await;
        let input = booking_request(event_id, tier_id);

        // Occupy the code every candidate will collide with.
        BookingRepo::create_with_codes(
            &pool,
            &input,
            std::iter::once("BK-TAKEN234".to_string()),
        )
        .await
        .unwrap();

        let taken = (0..CODE_COLLISION_RETRIES).map(|_| "BK-TAKEN234".to_string());
        let err = BookingRepo::create_with_codes(&pool, &input, taken)
            .await
            .unwrap_err();

        // Never AlreadyExists: code collisions are an internal matter.
        assert_matches!(err, CoreError::Internal(_));
        // Each colliding attempt rolled its reservation back.
        assert_eq!(sold_quantity(&pool, tier_id).await, 1);
    }

    #[sqlx::test(migrations = "../../db/migrations")]
    async fn collision_then_fresh_code_succeeds(pool: DbPool) {
        let (event_id, tier_id) = seed_tier(&pool).await;
        let input = booking_request(event_id, tier_id);

        BookingRepo::create_with_codes(
            &pool,
            &input,
            std::iter::once("BK-TAKEN234".to_string()),
        )
        .await
        .unwrap();

        let candidates = ["BK-TAKEN234", "BK-FRESH567"]
            .into_iter()
            .map(String::from);
        let booking = BookingRepo::create_with_codes(&pool, &input, candidates)
            .await
            .unwrap();
        assert_eq!(booking.booking_code, "BK-FRESH567");
        assert_eq!(sold_quantity(&pool, tier_id).await, 2);
    }
}
