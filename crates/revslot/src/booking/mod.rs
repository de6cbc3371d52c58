//! Slot publication and booking lifecycle.
//!
//! Business rules enforced here, on top of the store's atomic transitions:
//! 1. Only the owning faculty may publish or cancel a classroom's slots.
//! 2. Only a team's designated leader may book.
//! 3. A team holds at most one booking per review stage.
//! 4. Bookings close at the slot's deadline.
//! 5. A slot accepts at most one booking; racing attempts lose cleanly.

mod error;

pub use error::BookingError;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::{DbBooking, DbSlot, ReviewDbManager};
use crate::timetable::FreeSlot;

/// Availability label for a listed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SlotStatus {
    Available,
    Booked,
    Unavailable,
}

impl SlotStatus {
    fn derive(slot: &DbSlot, bookings_count: i64) -> Self {
        if slot.is_available {
            SlotStatus::Available
        } else if bookings_count > 0 {
            SlotStatus::Booked
        } else {
            SlotStatus::Unavailable
        }
    }
}

/// A slot row joined with its booking count and derived status label.
#[derive(Debug, Clone)]
pub struct SlotSummary {
    pub slot: DbSlot,
    pub bookings_count: i64,
    pub status: SlotStatus,
}

/// Coordinates slot publication and the booking state machine over the
/// review store.
pub struct BookingEngine {
    db: Arc<ReviewDbManager>,
}

impl BookingEngine {
    pub fn new(db: Arc<ReviewDbManager>) -> Self {
        Self { db }
    }

    /// Publishes faculty-selected candidate slots as bookable slot rows.
    ///
    /// The caller must own the target classroom. The insert is a single
    /// all-or-nothing batch.
    ///
    /// # Returns
    /// * `Ok(slot_ids)` - ids of the created rows, in candidate order
    pub fn publish_slots(
        &self,
        faculty_id: &str,
        classroom_id: i64,
        review_stage: &str,
        booking_deadline: DateTime<Utc>,
        duration_minutes: i64,
        candidates: &[FreeSlot],
    ) -> Result<Vec<i64>, BookingError> {
        let classroom = self
            .db
            .get_classroom(classroom_id)?
            .ok_or(BookingError::ClassroomNotFound)?;
        if classroom.faculty_id != faculty_id {
            return Err(BookingError::NotClassroomOwner);
        }

        let slot_ids = self.db.insert_slots(
            classroom_id,
            review_stage,
            booking_deadline,
            duration_minutes,
            candidates,
        )?;

        info!(
            classroom_id,
            review_stage,
            count = slot_ids.len(),
            "Published review slots"
        );

        Ok(slot_ids)
    }

    /// Books a slot for a team on behalf of `user_id`.
    ///
    /// `user_id` must be the team's leader; the remaining gates (deadline,
    /// duplicate stage, availability) are evaluated atomically by the store.
    pub fn book_slot(
        &self,
        user_id: &str,
        team_id: i64,
        slot_id: i64,
    ) -> Result<DbBooking, BookingError> {
        let correlation_id = generate_correlation_id();
        info!(
            correlation_id = %correlation_id,
            slot_id,
            team_id,
            "Booking attempt"
        );

        if !self.db.is_team_leader(team_id, user_id)? {
            warn!(
                correlation_id = %correlation_id,
                team_id,
                "Booking attempt by non-leader"
            );
            return Err(BookingError::Permission);
        }

        let result = self.db.create_booking(slot_id, team_id, Utc::now());

        match &result {
            Ok(booking) => {
                info!(
                    correlation_id = %correlation_id,
                    booking_id = booking.booking_id,
                    "Slot booked"
                );
            }
            Err(e) if e.is_rejection() => {
                warn!(
                    correlation_id = %correlation_id,
                    error = %e,
                    "Booking rejected"
                );
            }
            Err(e) => {
                warn!(
                    correlation_id = %correlation_id,
                    error = %e,
                    "Booking failed"
                );
            }
        }

        result
    }

    /// Cancels a published slot, deleting dependent bookings first.
    ///
    /// Only the owning faculty may cancel.
    pub fn cancel_slot(&self, faculty_id: &str, slot_id: i64) -> Result<(), BookingError> {
        let slot = self.db.get_slot(slot_id)?.ok_or(BookingError::SlotNotFound)?;
        let classroom = self
            .db
            .get_classroom(slot.classroom_id)?
            .ok_or(BookingError::ClassroomNotFound)?;
        if classroom.faculty_id != faculty_id {
            return Err(BookingError::NotClassroomOwner);
        }

        self.db.delete_slot(slot_id)?;
        info!(slot_id, classroom_id = slot.classroom_id, "Cancelled review slot");
        Ok(())
    }

    /// Lists a classroom's slots with booking counts and status labels.
    ///
    /// An unknown classroom yields an empty list; listing is a read path
    /// and degrades softly.
    pub fn classroom_slots(&self, classroom_id: i64) -> Result<Vec<SlotSummary>, BookingError> {
        let rows = self.db.slots_for_classroom(classroom_id)?;
        Ok(rows
            .into_iter()
            .map(|(slot, bookings_count)| SlotSummary {
                status: SlotStatus::derive(&slot, bookings_count),
                slot,
                bookings_count,
            })
            .collect())
    }

    /// Lists a team's bookings joined with their slots.
    pub fn team_bookings(&self, team_id: i64) -> Result<Vec<(DbBooking, DbSlot)>, BookingError> {
        Ok(self.db.bookings_for_team(team_id)?)
    }
}

/// Generates a unique correlation ID for request tracing.
fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    struct Fixture {
        engine: BookingEngine,
        db: Arc<ReviewDbManager>,
        classroom_id: i64,
    }

    fn fixture() -> Fixture {
        let db = Arc::new(ReviewDbManager::open_in_memory());
        let classroom_id = db.create_classroom("CSE Project Lab", "fac-1", "LNK123").unwrap();
        Fixture {
            engine: BookingEngine::new(db.clone()),
            db,
            classroom_id,
        }
    }

    fn team_with_leader(fx: &Fixture, name: &str, leader: &str) -> i64 {
        let team_id = fx.db.create_team(name, fx.classroom_id).unwrap();
        fx.db.add_team_member(team_id, leader, "leader").unwrap();
        team_id
    }

    fn candidate(start: &str, end: &str) -> FreeSlot {
        FreeSlot {
            day: crate::timetable::Weekday::Mon,
            start: start.parse().unwrap(),
            end: end.parse().unwrap(),
            code: None,
        }
    }

    fn publish_one(fx: &Fixture, stage: &str, deadline: DateTime<Utc>, start: &str, end: &str) -> i64 {
        fx.engine
            .publish_slots(
                "fac-1",
                fx.classroom_id,
                stage,
                deadline,
                30,
                &[candidate(start, end)],
            )
            .unwrap()[0]
    }

    fn future_deadline() -> DateTime<Utc> {
        Utc::now() + Duration::days(7)
    }

    #[test]
    fn test_publish_requires_ownership() {
        let fx = fixture();
        let result = fx.engine.publish_slots(
            "someone-else",
            fx.classroom_id,
            "Review 1",
            future_deadline(),
            30,
            &[candidate("10:00", "10:30")],
        );
        assert!(matches!(result, Err(BookingError::NotClassroomOwner)));
    }

    #[test]
    fn test_publish_unknown_classroom() {
        let fx = fixture();
        let result = fx.engine.publish_slots(
            "fac-1",
            9999,
            "Review 1",
            future_deadline(),
            30,
            &[candidate("10:00", "10:30")],
        );
        assert!(matches!(result, Err(BookingError::ClassroomNotFound)));
    }

    #[test]
    fn test_leader_books_open_slot() {
        let fx = fixture();
        let team_id = team_with_leader(&fx, "Team Alpha", "stu-1");
        let slot_id = publish_one(&fx, "Review 1", future_deadline(), "10:00", "10:30");

        let booking = fx.engine.book_slot("stu-1", team_id, slot_id).unwrap();
        assert_eq!(booking.slot_id, slot_id);
        assert_eq!(booking.team_id, team_id);

        let slot = fx.db.get_slot(slot_id).unwrap().unwrap();
        assert!(!slot.is_available);
    }

    #[test]
    fn test_non_leader_cannot_book() {
        let fx = fixture();
        let team_id = team_with_leader(&fx, "Team Alpha", "stu-1");
        fx.db.add_team_member(team_id, "stu-2", "member").unwrap();
        let slot_id = publish_one(&fx, "Review 1", future_deadline(), "10:00", "10:30");

        let result = fx.engine.book_slot("stu-2", team_id, slot_id);
        assert!(matches!(result, Err(BookingError::Permission)));

        // The slot stays open.
        assert!(fx.db.get_slot(slot_id).unwrap().unwrap().is_available);
    }

    #[test]
    fn test_one_booking_per_stage_per_team() {
        let fx = fixture();
        let team_id = team_with_leader(&fx, "Team Alpha", "stu-1");
        let first = publish_one(&fx, "Review 1", future_deadline(), "10:00", "10:30");
        let second = publish_one(&fx, "Review 1", future_deadline(), "11:00", "11:30");
        let other_stage = publish_one(&fx, "Review 2", future_deadline(), "14:00", "14:30");

        fx.engine.book_slot("stu-1", team_id, first).unwrap();

        let result = fx.engine.book_slot("stu-1", team_id, second);
        assert!(matches!(
            result,
            Err(BookingError::DuplicateStageBooking { ref stage }) if stage == "Review 1"
        ));

        // A different stage is still bookable.
        fx.engine.book_slot("stu-1", team_id, other_stage).unwrap();
    }

    #[test]
    fn test_deadline_cutoff() {
        let fx = fixture();
        let team_id = team_with_leader(&fx, "Team Alpha", "stu-1");
        let expired = Utc::now() - Duration::days(1);
        let slot_id = publish_one(&fx, "Review 1", expired, "10:00", "10:30");

        let result = fx.engine.book_slot("stu-1", team_id, slot_id);
        assert!(matches!(result, Err(BookingError::DeadlineExpired { .. })));

        // Rejected attempts leave the slot open.
        assert!(fx.db.get_slot(slot_id).unwrap().unwrap().is_available);
    }

    #[test]
    fn test_second_team_loses_claimed_slot() {
        let fx = fixture();
        let alpha = team_with_leader(&fx, "Team Alpha", "stu-1");
        let beta = team_with_leader(&fx, "Team Beta", "stu-2");
        let slot_id = publish_one(&fx, "Review 1", future_deadline(), "10:00", "10:30");

        fx.engine.book_slot("stu-1", alpha, slot_id).unwrap();

        let result = fx.engine.book_slot("stu-2", beta, slot_id);
        assert!(matches!(result, Err(BookingError::SlotUnavailable)));
    }

    #[test]
    fn test_concurrent_attempts_yield_one_booking() {
        let fx = fixture();
        let slot_id = publish_one(&fx, "Review 1", future_deadline(), "10:00", "10:30");

        let teams: Vec<(i64, String)> = (0..4)
            .map(|i| {
                let leader = format!("stu-{i}");
                (team_with_leader(&fx, &format!("Team {i}"), &leader), leader)
            })
            .collect();

        let engine = Arc::new(BookingEngine::new(fx.db.clone()));
        let handles: Vec<_> = teams
            .into_iter()
            .map(|(team_id, leader)| {
                let engine = engine.clone();
                std::thread::spawn(move || engine.book_slot(&leader, team_id, slot_id))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let losses = results
            .iter()
            .filter(|r| matches!(r, Err(BookingError::SlotUnavailable)))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(losses, 3);
    }

    #[test]
    fn test_split_candidates_publish_and_book() {
        let fx = fixture();
        let team_id = team_with_leader(&fx, "Team Alpha", "stu-1");

        // A 90-minute free interval split into 30-minute candidates.
        let parent = candidate("10:00", "11:30");
        let candidates =
            crate::timetable::split_slot_by_duration(&parent, 30).unwrap();
        assert_eq!(candidates.len(), 3);

        let slot_ids = fx
            .engine
            .publish_slots(
                "fac-1",
                fx.classroom_id,
                "Review 1",
                future_deadline(),
                30,
                &candidates,
            )
            .unwrap();
        assert_eq!(slot_ids.len(), 3);

        let first = fx.db.get_slot(slot_ids[0]).unwrap().unwrap();
        assert_eq!(first.day, "MON");
        assert_eq!(first.start_time, "10:00");
        assert_eq!(first.end_time, "10:30");

        fx.engine.book_slot("stu-1", team_id, slot_ids[0]).unwrap();
        let summaries = fx.engine.classroom_slots(fx.classroom_id).unwrap();
        assert_eq!(
            summaries.iter().filter(|s| s.status == SlotStatus::Available).count(),
            2
        );
    }

    #[test]
    fn test_cancel_cascades_bookings() {
        let fx = fixture();
        let team_id = team_with_leader(&fx, "Team Alpha", "stu-1");
        let slot_id = publish_one(&fx, "Review 1", future_deadline(), "10:00", "10:30");
        fx.engine.book_slot("stu-1", team_id, slot_id).unwrap();

        fx.engine.cancel_slot("fac-1", slot_id).unwrap();

        assert!(fx.db.get_slot(slot_id).unwrap().is_none());
        assert!(fx.engine.team_bookings(team_id).unwrap().is_empty());

        // The team is free to book the stage again.
        let replacement = publish_one(&fx, "Review 1", future_deadline(), "11:00", "11:30");
        fx.engine.book_slot("stu-1", team_id, replacement).unwrap();
    }

    #[test]
    fn test_cancel_requires_ownership() {
        let fx = fixture();
        let slot_id = publish_one(&fx, "Review 1", future_deadline(), "10:00", "10:30");

        let result = fx.engine.cancel_slot("someone-else", slot_id);
        assert!(matches!(result, Err(BookingError::NotClassroomOwner)));
    }

    #[test]
    fn test_listing_unknown_classroom_is_empty() {
        let fx = fixture();
        assert!(fx.engine.classroom_slots(4242).unwrap().is_empty());
    }

    #[test]
    fn test_listing_reports_status_labels() {
        let fx = fixture();
        let team_id = team_with_leader(&fx, "Team Alpha", "stu-1");
        let booked = publish_one(&fx, "Review 1", future_deadline(), "10:00", "10:30");
        let open = publish_one(&fx, "Review 1", future_deadline(), "11:00", "11:30");
        fx.engine.book_slot("stu-1", team_id, booked).unwrap();

        let summaries = fx.engine.classroom_slots(fx.classroom_id).unwrap();
        assert_eq!(summaries.len(), 2);

        let by_id = |id: i64| summaries.iter().find(|s| s.slot.slot_id == id).unwrap();
        assert_eq!(by_id(booked).status, SlotStatus::Booked);
        assert_eq!(by_id(booked).bookings_count, 1);
        assert_eq!(by_id(open).status, SlotStatus::Available);
    }
}
