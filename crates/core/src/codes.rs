//! Code generation for bookings, tickets, and group invites.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the repository layer and any future admin tooling.
//!
//! Two classes of identifier are generated here:
//!
//! - **Shareable codes** (booking codes, invite codes): short, uppercase,
//!   built from an alphabet without easily-confused characters so they can
//!   be read over the phone. Uniqueness is enforced by the database; the
//!   caller retries with a fresh code on a unique-constraint collision.
//! - **Scan codes**: unguessable tokens embedded in ticket QR payloads.
//!   These must never be enumerable, so they are full random UUIDs.

use rand::Rng;
use uuid::Uuid;

/// Length of the random portion of a booking code.
pub const BOOKING_CODE_LENGTH: usize = 8;

/// Length of a group invite code.
pub const INVITE_CODE_LENGTH: usize = 8;

/// Maximum internal retries when a generated code collides with an
/// existing row's unique constraint.
pub const CODE_COLLISION_RETRIES: u32 = 3;

/// Alphabet for human-shareable codes. Excludes `0/O`, `1/I/L` to avoid
/// transcription mistakes.
const SHAREABLE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

fn shareable(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..SHAREABLE_ALPHABET.len());
            SHAREABLE_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a booking code, e.g. `BK-7KQ2M9XF`.
pub fn generate_booking_code() -> String {
    format!("BK-{}", shareable(BOOKING_CODE_LENGTH))
}

/// Generate a group invite code, e.g. `GRP-W3N8TKDQ`.
pub fn generate_invite_code() -> String {
    format!("GRP-{}", shareable(INVITE_CODE_LENGTH))
}

/// Generate a ticket number, e.g. `TKT-000123-0004`.
///
/// Ticket numbers are display identifiers: derived from the order id and
/// the unit's position within the order, they are deterministic for a
/// given order so that a retried completion cannot mint a different set.
pub fn ticket_number(order_id: i64, unit_index: u32) -> String {
    format!("TKT-{order_id:06}-{unit_index:04}")
}

/// Generate an unguessable scan code for a ticket QR payload.
pub fn generate_scan_code() -> String {
    Uuid::new_v4().simple().to_string()
}
