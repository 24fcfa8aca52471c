//! Booking entity models and DTOs for the quick single-tier purchase path.

use gatelist_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub event_id: DbId,
    pub tier_id: DbId,
    pub quantity: i32,
    pub customer_email: String,
    pub customer_name: String,
    pub total_amount_cents: Cents,
    pub booking_code: String,
    pub status: String,
    pub checked_in_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /bookings`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBooking {
    pub event_id: DbId,
    pub ticket_tier_id: DbId,
    #[validate(range(min = 1, max = 100))]
    pub quantity: i32,
    #[validate(email)]
    pub customer_email: String,
    #[validate(length(min = 1))]
    pub customer_name: String,
}

/// DTO for `POST /bookings/checkin`.
#[derive(Debug, Deserialize)]
pub struct CheckInBooking {
    pub booking_code: String,
}

/// DTO for `POST /bookings/cancel`.
#[derive(Debug, Deserialize)]
pub struct CancelBooking {
    pub booking_code: String,
}

/// Booking joined with event/tier display fields for `GET /bookings/{code}`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingDetails {
    pub id: DbId,
    pub booking_code: String,
    pub status: String,
    pub quantity: i32,
    pub customer_email: String,
    pub customer_name: String,
    pub total_amount_cents: Cents,
    pub checked_in_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub event_name: String,
    pub event_starts_at: Timestamp,
    pub tier_name: String,
}
