//! Route definitions for the `/group-bookings` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::group_bookings;
use crate::state::AppState;

/// Routes mounted at `/group-bookings`.
///
/// ```text
/// POST   /                        -> create_group
/// POST   /join                    -> join_group
/// POST   /lock                    -> lock_group
/// POST   /seating                 -> assign_seating
/// GET    /checkin/{invite_code}   -> group_check_in
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(group_bookings::create_group))
        .route("/join", post(group_bookings::join_group))
        .route("/lock", post(group_bookings::lock_group))
        .route("/seating", post(group_bookings::assign_seating))
        .route("/checkin/{invite_code}", get(group_bookings::group_check_in))
}
