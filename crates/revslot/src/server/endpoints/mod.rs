pub mod bookings;
pub mod slots;
pub mod status;
pub mod timetable;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::booking::BookingError;
use crate::server::types::ApiErrorType;

/// Converts a booking failure to its API response.
pub(crate) fn booking_error_to_response(error: BookingError) -> Response {
    let (status, message) = match &error {
        BookingError::Permission => (
            StatusCode::FORBIDDEN,
            "Only the team leader can book review slots",
        ),
        BookingError::NotClassroomOwner => (
            StatusCode::FORBIDDEN,
            "Only the owning faculty can manage this classroom's slots",
        ),
        BookingError::DuplicateStageBooking { .. } => (
            StatusCode::CONFLICT,
            "Team already has a booking for this review stage",
        ),
        BookingError::SlotUnavailable => (
            StatusCode::CONFLICT,
            "Slot is no longer available",
        ),
        BookingError::DeadlineExpired { .. } => (
            StatusCode::GONE,
            "Booking deadline has passed",
        ),
        BookingError::SlotNotFound => (StatusCode::NOT_FOUND, "Slot not found"),
        BookingError::ClassroomNotFound => (StatusCode::NOT_FOUND, "Classroom not found"),
        BookingError::Store(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Storage error",
        ),
    };

    ApiErrorType::from((status, message, Some(error.to_string()))).into_response()
}
