pub mod bookings;
pub mod group_bookings;
pub mod health;
pub mod tickets;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /bookings                           create (POST)
/// /bookings/checkin                   check in by booking code (POST)
/// /bookings/cancel                    cancel + release capacity (POST)
/// /bookings/{code}                    booking details (GET)
///
/// /tickets/orders                     create order (POST)
/// /tickets/orders/complete            confirm payment + mint (POST)
/// /tickets/orders/refund              void tickets + release capacity (POST)
/// /tickets/validate/{scan_code}       door scan (POST)
/// /tickets/users/{user_id}            user's tickets, paginated (GET)
///
/// /group-bookings                     create group (POST)
/// /group-bookings/join                join via invite code (POST)
/// /group-bookings/lock                organizer lock (POST)
/// /group-bookings/seating             seat assignment batch (POST)
/// /group-bookings/checkin/{invite}    check-in roster (GET)
///
/// /events/{event_id}/subscribe        dashboard WebSocket (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/bookings", bookings::router())
        .nest("/tickets", tickets::router())
        .nest("/group-bookings", group_bookings::router())
        .route("/events/{event_id}/subscribe", get(ws::subscribe_handler))
}
