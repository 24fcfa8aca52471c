//! Handlers for the quick single-tier booking flow.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use validator::Validate;

use gatelist_core::CoreError;
use gatelist_db::models::booking::{Booking, CancelBooking, CheckInBooking, CreateBooking};
use gatelist_db::repositories::BookingRepo;
use gatelist_events::BookingEvent;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/bookings
///
/// Create a confirmed booking, reserving tier capacity atomically. The
/// confirmation email and dashboard event are dispatched after commit;
/// their failure never unwinds the booking.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(input): Json<CreateBooking>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let booking = BookingRepo::create_confirmed(&state.pool, &input).await?;

    tracing::info!(
        booking_code = %booking.booking_code,
        event_id = booking.event_id,
        tier_id = booking.tier_id,
        quantity = booking.quantity,
        "Booking confirmed"
    );

    notify_and_publish(&state, &booking, BookingEvent::BOOKING_CREATED).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
}

/// POST /api/v1/bookings/checkin
///
/// Flip a confirmed booking to checked-in, exactly once.
pub async fn check_in_booking(
    State(state): State<AppState>,
    Json(input): Json<CheckInBooking>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingRepo::check_in(&state.pool, &input.booking_code)
        .await?
        .ok_or_else(|| CoreError::not_found("Booking", &input.booking_code))?;

    tracing::info!(booking_code = %booking.booking_code, "Booking checked in");

    let event = BookingEvent::new(
        BookingEvent::BOOKING_CHECKED_IN,
        booking.event_id,
        serde_json::to_value(&booking).unwrap_or_default(),
    );
    state.fanout.publish(event).await;

    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/bookings/cancel
///
/// Cancel a pending or confirmed booking, returning its capacity to the
/// tier. Checked-in bookings cannot be cancelled.
pub async fn cancel_booking(
    State(state): State<AppState>,
    Json(input): Json<CancelBooking>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingRepo::cancel(&state.pool, &input.booking_code).await?;

    tracing::info!(
        booking_code = %booking.booking_code,
        tier_id = booking.tier_id,
        quantity = booking.quantity,
        "Booking cancelled"
    );

    Ok(Json(DataResponse { data: booking }))
}

/// GET /api/v1/bookings/{code}
///
/// Booking joined with event/tier display fields.
pub async fn get_booking(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let details = BookingRepo::find_details_by_code(&state.pool, &code)
        .await?
        .ok_or_else(|| CoreError::not_found("Booking", &code))?;

    Ok(Json(DataResponse { data: details }))
}

/// Post-commit side effects for a booking: confirmation email (spawned,
/// best-effort) and dashboard fanout.
async fn notify_and_publish(state: &AppState, booking: &Booking, event_type: &str) {
    let notifier = state.notifier.clone();
    let for_email = booking.clone();
    tokio::spawn(async move {
        if let Err(e) = notifier.send_booking_confirmation(&for_email).await {
            tracing::warn!(
                booking_code = %for_email.booking_code,
                error = %e,
                "Booking confirmation delivery failed"
            );
        }
    });

    let event = BookingEvent::new(
        event_type,
        booking.event_id,
        serde_json::to_value(booking).unwrap_or_default(),
    );
    let delivered = state.fanout.publish(event).await;
    tracing::debug!(
        event_id = booking.event_id,
        delivered,
        "Published booking event to dashboards"
    );
}
