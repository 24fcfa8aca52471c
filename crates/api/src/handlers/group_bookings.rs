//! Handlers for group booking coordination.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use validator::Validate;

use gatelist_core::audit::action_types;
use gatelist_core::CoreError;
use gatelist_db::models::audit::RecordAction;
use gatelist_db::models::group::{AssignSeating, CreateGroup, JoinGroup, LockGroup};
use gatelist_db::repositories::{AuditRepo, BookingRepo, GroupRepo};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/group-bookings
///
/// Open a new group booking pool with a shareable invite code.
pub async fn create_group(
    State(state): State<AppState>,
    Json(input): Json<CreateGroup>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let group = GroupRepo::create(
        &state.pool,
        input.event_id,
        &input.organizer_email,
        &input.organizer_name,
        input.max_size,
    )
    .await?;

    tracing::info!(
        invite_code = %group.invite_code,
        event_id = group.event_id,
        "Group booking created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: group })))
}

/// POST /api/v1/group-bookings/join
///
/// Attach an existing booking to a group via its invite code.
pub async fn join_group(
    State(state): State<AppState>,
    Json(input): Json<JoinGroup>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let booking = BookingRepo::find_by_code(&state.pool, &input.booking_code)
        .await?
        .ok_or_else(|| CoreError::not_found("Booking", &input.booking_code))?;

    let member = GroupRepo::add_member(
        &state.pool,
        &input.invite_code,
        booking.id,
        &input.member_name,
    )
    .await?;

    tracing::info!(
        invite_code = %input.invite_code,
        booking_code = %input.booking_code,
        "Member joined group"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// POST /api/v1/group-bookings/lock
///
/// One-way organizer lock: membership and seating are frozen afterwards.
pub async fn lock_group(
    State(state): State<AppState>,
    Json(input): Json<LockGroup>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let group = GroupRepo::lock(&state.pool, &input.invite_code, &input.organizer_email).await?;

    tracing::info!(invite_code = %group.invite_code, "Group booking locked");

    record_audit(
        &state,
        RecordAction {
            action_type: action_types::GROUP_LOCK,
            actor_email: input.organizer_email,
            entity_type: "group_booking",
            entity_id: group.id,
            details: serde_json::json!({ "invite_code": group.invite_code }),
        },
    )
    .await;

    Ok(Json(DataResponse { data: group }))
}

/// Response payload for a seating batch.
#[derive(Debug, Serialize)]
pub struct SeatingApplied {
    pub requested: usize,
    pub applied: usize,
}

/// POST /api/v1/group-bookings/seating
///
/// Replace seat assignments for member bookings. Assignments referencing
/// bookings outside the group are skipped; `applied` reports how many
/// actually landed.
pub async fn assign_seating(
    State(state): State<AppState>,
    Json(input): Json<AssignSeating>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let requested = input.assignments.len();
    let applied = GroupRepo::replace_seating(
        &state.pool,
        &input.invite_code,
        &input.organizer_email,
        &input.assignments,
    )
    .await?;

    tracing::info!(
        invite_code = %input.invite_code,
        requested,
        applied,
        "Seating assignments applied"
    );

    let group = GroupRepo::find_by_invite_code(&state.pool, &input.invite_code).await?;
    if let Some(group) = group {
        record_audit(
            &state,
            RecordAction {
                action_type: action_types::GROUP_SEATING,
                actor_email: input.organizer_email,
                entity_type: "group_booking",
                entity_id: group.id,
                details: serde_json::json!({ "requested": requested, "applied": applied }),
            },
        )
        .await;
    }

    Ok(Json(DataResponse {
        data: SeatingApplied { requested, applied },
    }))
}

/// GET /api/v1/group-bookings/checkin/{invite_code}
///
/// Per-member check-in roster plus aggregate counts. Pure read.
pub async fn group_check_in(
    State(state): State<AppState>,
    Path(invite_code): Path<String>,
) -> AppResult<impl IntoResponse> {
    let roster = GroupRepo::check_in_roster(&state.pool, &invite_code).await?;
    Ok(Json(DataResponse { data: roster }))
}

/// Record an audit entry, logging (not surfacing) failures: the audited
/// action has already committed.
async fn record_audit(state: &AppState, action: RecordAction) {
    if let Err(e) = AuditRepo::record(&state.pool, &action).await {
        tracing::warn!(
            action_type = action.action_type,
            entity_id = action.entity_id,
            error = %e,
            "Failed to record audit entry"
        );
    }
}
