//! Group booking models: invite pools, membership, seating, chat log.

use gatelist_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `group_bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupBooking {
    pub id: DbId,
    pub event_id: DbId,
    pub organizer_email: String,
    pub organizer_name: String,
    pub invite_code: String,
    pub status: String,
    pub max_size: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `group_members` table; each member wraps one booking.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupMember {
    pub id: DbId,
    pub group_booking_id: DbId,
    pub booking_id: DbId,
    pub member_name: String,
    pub joined_at: Timestamp,
}

/// A row from the `seating_assignments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeatingAssignment {
    pub id: DbId,
    pub group_booking_id: DbId,
    pub booking_id: DbId,
    pub section: String,
    pub row_label: String,
    pub seat_number: String,
    pub created_at: Timestamp,
}

/// A row from the `group_messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupMessage {
    pub id: DbId,
    pub group_booking_id: DbId,
    pub sender: String,
    pub body: String,
    pub created_at: Timestamp,
}

/// Sender value for messages written by the system itself.
pub const MESSAGE_SENDER_SYSTEM: &str = "system";

/// DTO for `POST /group-bookings`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroup {
    pub event_id: DbId,
    #[validate(email)]
    pub organizer_email: String,
    #[validate(length(min = 1))]
    pub organizer_name: String,
    #[validate(range(min = 1, max = 500))]
    pub max_size: i32,
}

/// DTO for `POST /group-bookings/join`.
#[derive(Debug, Deserialize, Validate)]
pub struct JoinGroup {
    pub invite_code: String,
    pub booking_code: String,
    #[validate(length(min = 1))]
    pub member_name: String,
}

/// DTO for `POST /group-bookings/lock`.
#[derive(Debug, Deserialize, Validate)]
pub struct LockGroup {
    pub invite_code: String,
    #[validate(email)]
    pub organizer_email: String,
}

/// One requested seat in a seating batch.
#[derive(Debug, Serialize, Deserialize)]
pub struct SeatRequest {
    pub booking_id: DbId,
    pub section: String,
    pub row_label: String,
    pub seat_number: String,
}

/// DTO for `POST /group-bookings/seating`.
#[derive(Debug, Deserialize, Validate)]
pub struct AssignSeating {
    pub invite_code: String,
    #[validate(email)]
    pub organizer_email: String,
    #[validate(length(min = 1))]
    pub assignments: Vec<SeatRequest>,
}

/// One member line in the group check-in roster.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RosterEntry {
    pub booking_id: DbId,
    pub member_name: String,
    pub booking_code: String,
    pub booking_status: String,
    pub checked_in_at: Option<Timestamp>,
    pub section: Option<String>,
    pub row_label: Option<String>,
    pub seat_number: Option<String>,
}

/// Aggregate check-in view for `GET /group-bookings/checkin/{invite_code}`.
#[derive(Debug, Serialize)]
pub struct GroupCheckIn {
    pub group: GroupBooking,
    pub members: Vec<RosterEntry>,
    pub checked_in_count: i64,
    pub total_count: i64,
}
