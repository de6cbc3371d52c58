//! API endpoints for team bookings.

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use super::booking_error_to_response;
use crate::auth::AuthUser;
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct BookSlotRequest {
    pub slot_id: i64,
    pub team_id: i64,
}

/// POST /bookings
///
/// Books a slot for the caller's team. The caller must be the team leader;
/// the slot must be open, within its deadline, and the team must not
/// already hold a booking for the slot's review stage.
pub async fn post_book_slot(
    State(s): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<BookSlotRequest>,
) -> Response {
    info!("POST /bookings (slot={}, team={})", req.slot_id, req.team_id);

    match s.engine.book_slot(&user.user_id, req.team_id, req.slot_id) {
        Ok(booking) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Slot booked successfully",
                "booking_id": booking.booking_id,
                "slot_id": booking.slot_id,
                "team_id": booking.team_id,
            })),
        )
            .into_response(),
        Err(e) => booking_error_to_response(e),
    }
}

/// GET /bookings/team/:team_id
///
/// Returns the team's bookings joined with their slots.
pub async fn get_team_bookings(
    Path(team_id): Path<i64>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /bookings/team/{}", team_id);

    match s.engine.team_bookings(team_id) {
        Ok(rows) => {
            let response: Vec<_> = rows
                .into_iter()
                .map(|(booking, slot)| {
                    json!({
                        "booking_id": booking.booking_id,
                        "slot": {
                            "id": slot.slot_id,
                            "classroom_id": slot.classroom_id,
                            "day": slot.day,
                            "start_time": slot.start_time,
                            "end_time": slot.end_time,
                            "duration_minutes": slot.duration_minutes,
                            "review_stage": slot.review_stage,
                            "booking_deadline": slot.booking_deadline,
                        },
                    })
                })
                .collect();

            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to fetch team bookings: {}", e);
            booking_error_to_response(e)
        }
    }
}
