//! Repository for group bookings: invite pools, locking, seating, and the
//! aggregate check-in roster.
//!
//! The invite code together with the organizer email acts as the
//! credential for organizer-only operations; a mismatch is reported as
//! `NotFound` so the existence of a group is never leaked to someone
//! holding only the code.

use std::collections::HashSet;

use gatelist_core::codes::{self, CODE_COLLISION_RETRIES};
use gatelist_core::states::{GroupAction, GroupStatus};
use gatelist_core::types::DbId;
use gatelist_core::CoreError;
use sqlx::PgExecutor;

use crate::models::group::{
    GroupBooking, GroupCheckIn, GroupMember, GroupMessage, RosterEntry, SeatRequest,
    MESSAGE_SENDER_SYSTEM,
};
use crate::repositories::{internal, is_unique_violation};
use crate::DbPool;

/// Column list for `group_bookings` queries.
const COLUMNS: &str = "\
    id, event_id, organizer_email, organizer_name, invite_code, status, \
    max_size, created_at, updated_at";

/// Column list for `group_members` queries.
const MEMBER_COLUMNS: &str = "id, group_booking_id, booking_id, member_name, joined_at";

pub struct GroupRepo;

impl GroupRepo {
    /// Create a new active group with a fresh invite code.
    pub async fn create(
        pool: &DbPool,
        event_id: DbId,
        organizer_email: &str,
        organizer_name: &str,
        max_size: i32,
    ) -> Result<GroupBooking, CoreError> {
        if max_size < 1 {
            return Err(CoreError::InvalidArgument(
                "group size must be at least 1".into(),
            ));
        }

        for attempt in 1..=CODE_COLLISION_RETRIES {
            let invite_code = codes::generate_invite_code();
            let result = sqlx::query_as::<_, GroupBooking>(&format!(
                "INSERT INTO group_bookings \
                    (event_id, organizer_email, organizer_name, invite_code, status, max_size) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING {COLUMNS}"
            ))
            .bind(event_id)
            .bind(organizer_email)
            .bind(organizer_name)
            .bind(&invite_code)
            .bind(GroupStatus::Active.as_str())
            .bind(max_size)
            .fetch_one(pool)
            .await;

            match result {
                Ok(group) => return Ok(group),
                Err(e) if is_unique_violation(&e, "uq_group_bookings_invite_code") => {
                    tracing::warn!(attempt, invite_code, "Invite code collision, retrying");
                }
                Err(e) => return Err(internal(e)),
            }
        }
        Err(CoreError::Internal(
            "could not allocate a unique invite code".into(),
        ))
    }

    /// Fetch a group by its invite code.
    pub async fn find_by_invite_code<'e>(
        executor: impl PgExecutor<'e>,
        invite_code: &str,
    ) -> Result<Option<GroupBooking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM group_bookings WHERE invite_code = $1");
        sqlx::query_as::<_, GroupBooking>(&query)
            .bind(invite_code)
            .fetch_optional(executor)
            .await
    }

    /// Attach an existing booking to a group as a new member.
    ///
    /// Rejected once the group is locked (membership is frozen) or full.
    pub async fn add_member(
        pool: &DbPool,
        invite_code: &str,
        booking_id: DbId,
        member_name: &str,
    ) -> Result<GroupMember, CoreError> {
        let mut tx = pool.begin().await.map_err(internal)?;

        let group = Self::lock_row(&mut *tx, invite_code).await?;
        if GroupStatus::parse(&group.status)? != GroupStatus::Active {
            return Err(CoreError::FailedPrecondition(format!(
                "group {} is {} and no longer accepts members",
                group.invite_code, group.status
            )));
        }

        let member_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM group_members WHERE group_booking_id = $1")
                .bind(group.id)
                .fetch_one(&mut *tx)
                .await
                .map_err(internal)?;
        if member_count >= group.max_size as i64 {
            return Err(CoreError::ResourceExhausted(format!(
                "group {} is full ({} members)",
                group.invite_code, group.max_size
            )));
        }

        let member = sqlx::query_as::<_, GroupMember>(&format!(
            "INSERT INTO group_members (group_booking_id, booking_id, member_name) \
             VALUES ($1, $2, $3) \
             RETURNING {MEMBER_COLUMNS}"
        ))
        .bind(group.id)
        .bind(booking_id)
        .bind(member_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "uq_group_members_booking") {
                CoreError::AlreadyExists(format!("booking {booking_id} is already in a group"))
            } else {
                internal(e)
            }
        })?;

        tx.commit().await.map_err(internal)?;
        Ok(member)
    }

    /// Lock a group: one-way `active → locked`, organizer only.
    ///
    /// Appends a system message to the group's chat log in the same
    /// transaction.
    pub async fn lock(
        pool: &DbPool,
        invite_code: &str,
        organizer_email: &str,
    ) -> Result<GroupBooking, CoreError> {
        let mut tx = pool.begin().await.map_err(internal)?;

        let group = Self::lock_row(&mut *tx, invite_code).await?;
        Self::authorize(&group, organizer_email, invite_code)?;

        let next = GroupStatus::parse(&group.status)?.transition(GroupAction::Lock)?;

        let group = sqlx::query_as::<_, GroupBooking>(&format!(
            "UPDATE group_bookings SET status = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        ))
        .bind(group.id)
        .bind(next.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(internal)?;

        sqlx::query(
            "INSERT INTO group_messages (group_booking_id, sender, body) VALUES ($1, $2, $3)",
        )
        .bind(group.id)
        .bind(MESSAGE_SENDER_SYSTEM)
        .bind(format!(
            "The group was locked by {}. Membership and seating are now frozen.",
            group.organizer_name
        ))
        .execute(&mut *tx)
        .await
        .map_err(internal)?;

        tx.commit().await.map_err(internal)?;
        Ok(group)
    }

    /// Replace seat assignments for member bookings, organizer only.
    ///
    /// Assignments referencing bookings outside the group are skipped,
    /// not failed: the rest of the batch still applies, and the returned
    /// count tells the organizer how many actually landed. Requires an
    /// active (unlocked) group; a locked group's composition, seating
    /// included, is frozen.
    pub async fn replace_seating(
        pool: &DbPool,
        invite_code: &str,
        organizer_email: &str,
        assignments: &[SeatRequest],
    ) -> Result<usize, CoreError> {
        let mut tx = pool.begin().await.map_err(internal)?;

        let group = Self::lock_row(&mut *tx, invite_code).await?;
        Self::authorize(&group, organizer_email, invite_code)?;

        if GroupStatus::parse(&group.status)? != GroupStatus::Active {
            return Err(CoreError::FailedPrecondition(format!(
                "group {} is {}; seating is frozen",
                group.invite_code, group.status
            )));
        }

        let member_bookings: HashSet<DbId> =
            sqlx::query_scalar("SELECT booking_id FROM group_members WHERE group_booking_id = $1")
                .bind(group.id)
                .fetch_all(&mut *tx)
                .await
                .map_err(internal)?
                .into_iter()
                .collect();

        let mut applied = 0;
        for seat in assignments {
            if !member_bookings.contains(&seat.booking_id) {
                tracing::debug!(
                    group_id = group.id,
                    booking_id = seat.booking_id,
                    "Skipping seat assignment for non-member booking"
                );
                continue;
            }

            sqlx::query(
                "DELETE FROM seating_assignments \
                 WHERE group_booking_id = $1 AND booking_id = $2",
            )
            .bind(group.id)
            .bind(seat.booking_id)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;

            sqlx::query(
                "INSERT INTO seating_assignments \
                    (group_booking_id, booking_id, section, row_label, seat_number) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(group.id)
            .bind(seat.booking_id)
            .bind(&seat.section)
            .bind(&seat.row_label)
            .bind(&seat.seat_number)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;

            applied += 1;
        }

        tx.commit().await.map_err(internal)?;
        Ok(applied)
    }

    /// Aggregate check-in roster for a group. Pure read.
    pub async fn check_in_roster(
        pool: &DbPool,
        invite_code: &str,
    ) -> Result<GroupCheckIn, CoreError> {
        let group = Self::find_by_invite_code(pool, invite_code)
            .await
            .map_err(internal)?
            .ok_or_else(|| CoreError::not_found("GroupBooking", invite_code))?;

        let members = sqlx::query_as::<_, RosterEntry>(
            "SELECT m.booking_id, m.member_name, \
                    b.booking_code, b.status AS booking_status, b.checked_in_at, \
                    s.section, s.row_label, s.seat_number \
             FROM group_members m \
             JOIN bookings b ON b.id = m.booking_id \
             LEFT JOIN seating_assignments s ON s.booking_id = m.booking_id \
             WHERE m.group_booking_id = $1 \
             ORDER BY m.joined_at, m.id",
        )
        .bind(group.id)
        .fetch_all(pool)
        .await
        .map_err(internal)?;

        let total_count = members.len() as i64;
        let checked_in_count = members
            .iter()
            .filter(|m| m.booking_status == gatelist_core::states::BookingStatus::CheckedIn.as_str())
            .count() as i64;

        Ok(GroupCheckIn {
            group,
            members,
            checked_in_count,
            total_count,
        })
    }

    /// List a group's chat log, oldest first.
    pub async fn list_messages<'e>(
        executor: impl PgExecutor<'e>,
        group_booking_id: DbId,
    ) -> Result<Vec<GroupMessage>, sqlx::Error> {
        sqlx::query_as::<_, GroupMessage>(
            "SELECT id, group_booking_id, sender, body, created_at \
             FROM group_messages \
             WHERE group_booking_id = $1 \
             ORDER BY created_at, id",
        )
        .bind(group_booking_id)
        .fetch_all(executor)
        .await
    }

    /// Load a group row with `FOR UPDATE` inside a transaction.
    async fn lock_row(
        tx: &mut sqlx::PgConnection,
        invite_code: &str,
    ) -> Result<GroupBooking, CoreError> {
        sqlx::query_as::<_, GroupBooking>(&format!(
            "SELECT {COLUMNS} FROM group_bookings WHERE invite_code = $1 FOR UPDATE"
        ))
        .bind(invite_code)
        .fetch_optional(tx)
        .await
        .map_err(internal)?
        .ok_or_else(|| CoreError::not_found("GroupBooking", invite_code))
    }

    fn authorize(
        group: &GroupBooking,
        organizer_email: &str,
        invite_code: &str,
    ) -> Result<(), CoreError> {
        if group.organizer_email.eq_ignore_ascii_case(organizer_email) {
            Ok(())
        } else {
            Err(CoreError::not_found("GroupBooking", invite_code))
        }
    }
}
