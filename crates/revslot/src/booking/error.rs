//! Error types for slot publication and booking.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur in the booking lifecycle.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Booking attempted by someone other than the team leader
    #[error("Only the team leader can book review slots")]
    Permission,

    /// The team already holds a booking for this review stage
    #[error("Team already has a booking for review stage '{stage}'")]
    DuplicateStageBooking { stage: String },

    /// Booking attempted after the deadline
    #[error("Booking deadline has passed ({deadline})")]
    DeadlineExpired { deadline: DateTime<Utc> },

    /// The slot was claimed by another team first, or is otherwise closed
    #[error("Slot is no longer available")]
    SlotUnavailable,

    /// The referenced slot does not exist
    #[error("Slot not found")]
    SlotNotFound,

    /// The referenced classroom does not exist
    #[error("Classroom not found")]
    ClassroomNotFound,

    /// Publish/cancel attempted by a faculty member who does not own the
    /// classroom
    #[error("Only the owning faculty can manage this classroom's slots")]
    NotClassroomOwner,

    /// Underlying store failure, passed through with its message
    #[error("Storage error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl BookingError {
    /// Returns true if the failure is a business-rule rejection rather than
    /// a store fault; these are logged at warn rather than error level.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, BookingError::Store(_))
    }
}
