//! Route definitions for the `/bookings` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bookings;
use crate::state::AppState;

/// Routes mounted at `/bookings`.
///
/// ```text
/// POST   /                -> create_booking
/// POST   /checkin         -> check_in_booking
/// POST   /cancel          -> cancel_booking
/// GET    /{code}          -> get_booking
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(bookings::create_booking))
        .route("/checkin", post(bookings::check_in_booking))
        .route("/cancel", post(bookings::cancel_booking))
        .route("/{code}", get(bookings::get_booking))
}
