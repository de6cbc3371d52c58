//! Error types for timetable parsing and splitting.

use thiserror::Error;

use super::types::Weekday;

/// Errors that can occur while parsing a pasted timetable or splitting its
/// free intervals.
///
/// A parse either yields a complete `Schedule` or exactly one of these;
/// partially parsed grids are never returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimetableError {
    /// Fewer than the minimum number of non-empty lines
    #[error("Invalid timetable format: insufficient data")]
    InsufficientData,

    /// A timing cell was not a zero-padded HH:MM value
    #[error("Invalid time value '{value}' in {row}")]
    BadTime { value: String, row: String },

    /// A row disagreed with the grid's period count after Lunch filtering
    #[error("Column mismatch in {row}: expected {expected} period fields, found {found}")]
    ColumnMismatch {
        row: String,
        expected: usize,
        found: usize,
    },

    /// The weekday rows ran out before all five days were consumed
    #[error("Missing schedule rows for {day}")]
    MissingDay { day: Weekday },

    /// Split duration must be a positive number of minutes
    #[error("Review duration must be positive, got {minutes}")]
    InvalidDuration { minutes: i64 },
}
