/// Database module for classrooms, timetables, review slots, and bookings

mod types;

pub use types::{DbBooking, DbClassroom, DbSlot};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Result};
use std::sync::Mutex;

use crate::booking::BookingError;
use crate::timetable::FreeSlot;

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_review.sql");

pub struct ReviewDbManager {
    db: Mutex<Connection>,
}

impl ReviewDbManager {
    /// Creates a new ReviewDbManager and initializes the database schema
    pub fn new(db_path: &str) -> Self {
        let conn = Connection::open(db_path).expect("Failed to open database");

        conn.execute_batch(SCHEMA_SQL)
            .expect("Failed to initialize database schema");

        Self {
            db: Mutex::new(conn),
        }
    }

    /// Creates a manager over an in-memory database (tests and local runs)
    pub fn open_in_memory() -> Self {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory database");

        conn.execute_batch(SCHEMA_SQL)
            .expect("Failed to initialize database schema");

        Self {
            db: Mutex::new(conn),
        }
    }

    /// Inserts a classroom owned by `faculty_id`, returning its id
    pub fn create_classroom(
        &self,
        name: &str,
        faculty_id: &str,
        link_code: &str,
    ) -> Result<i64> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO classrooms (name, faculty_id, link_code, created_at)
             VALUES (?1, ?2, ?3, datetime('now'))",
            (name, faculty_id, link_code),
        )?;
        Ok(db.last_insert_rowid())
    }

    pub fn get_classroom(&self, classroom_id: i64) -> Result<Option<DbClassroom>> {
        let db = self.db.lock().unwrap();
        db.query_row(
            "SELECT classroom_id, name, faculty_id, link_code
             FROM classrooms WHERE classroom_id = ?",
            [classroom_id],
            |row| {
                Ok(DbClassroom {
                    classroom_id: row.get(0)?,
                    name: row.get(1)?,
                    faculty_id: row.get(2)?,
                    link_code: row.get(3)?,
                })
            },
        )
        .optional()
    }

    /// Inserts a team in a classroom, returning its id
    pub fn create_team(&self, name: &str, classroom_id: i64) -> Result<i64> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO teams (name, classroom_id, created_at)
             VALUES (?1, ?2, datetime('now'))",
            (name, classroom_id),
        )?;
        Ok(db.last_insert_rowid())
    }

    /// Adds a member to a team; `role` is 'leader' or 'member'
    pub fn add_team_member(&self, team_id: i64, user_id: &str, role: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR REPLACE INTO team_members (team_id, user_id, role)
             VALUES (?1, ?2, ?3)",
            (team_id, user_id, role),
        )?;
        Ok(())
    }

    /// Checks whether `user_id` is the designated leader of `team_id`
    pub fn is_team_leader(&self, team_id: i64, user_id: &str) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let count: i64 = db.query_row(
            "SELECT COUNT(*) FROM team_members
             WHERE team_id = ?1 AND user_id = ?2 AND role = 'leader'",
            (team_id, user_id),
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Stores (or replaces) the raw pasted timetable for a faculty member
    pub fn save_timetable(&self, faculty_id: &str, data: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO timetables (faculty_id, data, created_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(faculty_id) DO UPDATE SET data = excluded.data,
                                                   created_at = excluded.created_at",
            (faculty_id, data),
        )?;
        Ok(())
    }

    pub fn load_timetable(&self, faculty_id: &str) -> Result<Option<String>> {
        let db = self.db.lock().unwrap();
        db.query_row(
            "SELECT data FROM timetables WHERE faculty_id = ?",
            [faculty_id],
            |row| row.get(0),
        )
        .optional()
    }

    /// Inserts one slot row per candidate in a single transaction.
    ///
    /// The batch is all-or-nothing: a failure on any row rolls back every
    /// row, so a publish never leaves orphaned partial slots behind.
    pub fn insert_slots(
        &self,
        classroom_id: i64,
        review_stage: &str,
        booking_deadline: DateTime<Utc>,
        duration_minutes: i64,
        candidates: &[FreeSlot],
    ) -> Result<Vec<i64>> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        let mut slot_ids = Vec::with_capacity(candidates.len());
        for slot in candidates {
            tx.execute(
                "INSERT INTO slots (
                    classroom_id, day, start_time, end_time, duration_minutes,
                    review_stage, is_available, booking_deadline, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, datetime('now'))",
                (
                    classroom_id,
                    slot.day.code(),
                    slot.start.to_string(),
                    slot.end.to_string(),
                    duration_minutes,
                    review_stage,
                    booking_deadline,
                ),
            )?;
            slot_ids.push(tx.last_insert_rowid());
        }

        tx.commit()?;
        Ok(slot_ids)
    }

    pub fn get_slot(&self, slot_id: i64) -> Result<Option<DbSlot>> {
        let db = self.db.lock().unwrap();
        db.query_row(
            "SELECT slot_id, classroom_id, day, start_time, end_time,
                    duration_minutes, review_stage, is_available, booking_deadline
             FROM slots WHERE slot_id = ?",
            [slot_id],
            map_slot_row,
        )
        .optional()
    }

    /// Gets all slots for a classroom with their booking counts, ordered by
    /// day and start time
    pub fn slots_for_classroom(&self, classroom_id: i64) -> Result<Vec<(DbSlot, i64)>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT s.slot_id, s.classroom_id, s.day, s.start_time, s.end_time,
                    s.duration_minutes, s.review_stage, s.is_available, s.booking_deadline,
                    COUNT(b.booking_id)
             FROM slots s
             LEFT JOIN bookings b ON b.slot_id = s.slot_id
             WHERE s.classroom_id = ?
             GROUP BY s.slot_id
             ORDER BY s.day, s.start_time",
        )?;

        let rows = stmt.query_map([classroom_id], |row| {
            Ok((map_slot_row(row)?, row.get(9)?))
        })?;

        rows.collect()
    }

    /// Deletes a slot and any dependent bookings in one transaction.
    ///
    /// Bookings go first so referential integrity holds at every point.
    /// Returns false when the slot does not exist.
    pub fn delete_slot(&self, slot_id: i64) -> Result<bool> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        tx.execute("DELETE FROM bookings WHERE slot_id = ?", [slot_id])?;
        let deleted = tx.execute("DELETE FROM slots WHERE slot_id = ?", [slot_id])?;

        tx.commit()?;
        Ok(deleted > 0)
    }

    /// Books a slot for a team as one atomic transition.
    ///
    /// The whole check-and-claim runs inside a single transaction: the
    /// deadline and duplicate-stage gates are evaluated against committed
    /// state, and the availability flip is a conditional update, so of any
    /// number of racing attempts at most one can claim the slot.
    pub fn create_booking(
        &self,
        slot_id: i64,
        team_id: i64,
        now: DateTime<Utc>,
    ) -> std::result::Result<DbBooking, BookingError> {
        let mut db = self.db.lock().unwrap();
        let tx = db.transaction()?;

        let slot = tx
            .query_row(
                "SELECT slot_id, classroom_id, day, start_time, end_time,
                        duration_minutes, review_stage, is_available, booking_deadline
                 FROM slots WHERE slot_id = ?",
                [slot_id],
                map_slot_row,
            )
            .optional()?
            .ok_or(BookingError::SlotNotFound)?;

        if now >= slot.booking_deadline {
            return Err(BookingError::DeadlineExpired {
                deadline: slot.booking_deadline,
            });
        }

        let stage_bookings: i64 = tx.query_row(
            "SELECT COUNT(*) FROM bookings b
             JOIN slots s ON b.slot_id = s.slot_id
             WHERE b.team_id = ?1 AND s.review_stage = ?2",
            (team_id, &slot.review_stage),
            |row| row.get(0),
        )?;
        if stage_bookings > 0 {
            return Err(BookingError::DuplicateStageBooking {
                stage: slot.review_stage,
            });
        }

        let claimed = tx.execute(
            "UPDATE slots SET is_available = 0 WHERE slot_id = ?1 AND is_available = 1",
            [slot_id],
        )?;
        if claimed == 0 {
            return Err(BookingError::SlotUnavailable);
        }

        tx.execute(
            "INSERT INTO bookings (slot_id, team_id, created_at)
             VALUES (?1, ?2, datetime('now'))",
            (slot_id, team_id),
        )?;
        let booking_id = tx.last_insert_rowid();

        tx.commit()?;
        Ok(DbBooking {
            booking_id,
            slot_id,
            team_id,
        })
    }

    /// Gets all bookings for a team together with their slots
    pub fn bookings_for_team(&self, team_id: i64) -> Result<Vec<(DbBooking, DbSlot)>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT b.booking_id, b.slot_id, b.team_id,
                    s.slot_id, s.classroom_id, s.day, s.start_time, s.end_time,
                    s.duration_minutes, s.review_stage, s.is_available, s.booking_deadline
             FROM bookings b
             JOIN slots s ON b.slot_id = s.slot_id
             WHERE b.team_id = ?
             ORDER BY s.day, s.start_time",
        )?;

        let rows = stmt.query_map([team_id], |row| {
            let booking = DbBooking {
                booking_id: row.get(0)?,
                slot_id: row.get(1)?,
                team_id: row.get(2)?,
            };
            let slot = DbSlot {
                slot_id: row.get(3)?,
                classroom_id: row.get(4)?,
                day: row.get(5)?,
                start_time: row.get(6)?,
                end_time: row.get(7)?,
                duration_minutes: row.get(8)?,
                review_stage: row.get(9)?,
                is_available: row.get(10)?,
                booking_deadline: row.get(11)?,
            };
            Ok((booking, slot))
        })?;

        rows.collect()
    }
}

fn map_slot_row(row: &rusqlite::Row<'_>) -> Result<DbSlot> {
    Ok(DbSlot {
        slot_id: row.get(0)?,
        classroom_id: row.get(1)?,
        day: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        duration_minutes: row.get(5)?,
        review_stage: row.get(6)?,
        is_available: row.get(7)?,
        booking_deadline: row.get(8)?,
    })
}
