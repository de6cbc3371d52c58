//! API endpoints for slot publication and management.

use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use super::booking_error_to_response;
use crate::auth::AuthUser;
use crate::server::types::ApiErrorType;
use crate::timetable::FreeSlot;
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct PublishSlotsRequest {
    pub classroom_id: i64,
    pub review_stage: String,
    pub booking_deadline: DateTime<Utc>,
    pub duration_minutes: i64,
    /// Faculty-selected candidate slots, as returned by the splitter
    pub slots: Vec<FreeSlot>,
}

/// POST /slots/publish
///
/// Persists the selected candidate slots as bookable slot rows. The batch
/// is all-or-nothing.
pub async fn post_publish_slots(
    State(s): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<PublishSlotsRequest>,
) -> Response {
    info!(
        "POST /slots/publish (classroom={}, stage={}, count={})",
        req.classroom_id,
        req.review_stage,
        req.slots.len()
    );

    if req.slots.is_empty() {
        return ApiErrorType::from((
            StatusCode::BAD_REQUEST,
            "No slots selected",
            None,
        ))
        .into_response();
    }
    if req.duration_minutes < 1 {
        return ApiErrorType::from((
            StatusCode::BAD_REQUEST,
            "Review duration must be positive",
            None,
        ))
        .into_response();
    }

    match s.engine.publish_slots(
        &user.user_id,
        req.classroom_id,
        &req.review_stage,
        req.booking_deadline,
        req.duration_minutes,
        &req.slots,
    ) {
        Ok(slot_ids) => (
            StatusCode::CREATED,
            Json(json!({
                "created": slot_ids.len(),
                "slot_ids": slot_ids,
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to publish slots: {}", e);
            booking_error_to_response(e)
        }
    }
}

/// GET /slots/classroom/:classroom_id
///
/// Returns the classroom's slots with booking counts and status labels.
/// An unknown classroom yields an empty list.
pub async fn get_classroom_slots(
    Path(classroom_id): Path<i64>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /slots/classroom/{}", classroom_id);

    match s.engine.classroom_slots(classroom_id) {
        Ok(summaries) => {
            let response: Vec<_> = summaries
                .into_iter()
                .map(|summary| {
                    json!({
                        "id": summary.slot.slot_id,
                        "classroom_id": summary.slot.classroom_id,
                        "day": summary.slot.day,
                        "start_time": summary.slot.start_time,
                        "end_time": summary.slot.end_time,
                        "time": format!("{} - {}", summary.slot.start_time, summary.slot.end_time),
                        "duration_minutes": summary.slot.duration_minutes,
                        "review_stage": summary.slot.review_stage,
                        "booking_deadline": summary.slot.booking_deadline,
                        "is_available": summary.slot.is_available,
                        "bookings_count": summary.bookings_count,
                        "status": summary.status,
                    })
                })
                .collect();

            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to fetch classroom slots: {}", e);
            booking_error_to_response(e)
        }
    }
}

/// DELETE /slots/:slot_id
///
/// Cancels a published slot; any dependent bookings are removed first.
pub async fn delete_slot(
    Path(slot_id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    info!("DELETE /slots/{}", slot_id);

    match s.engine.cancel_slot(&user.user_id, slot_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Slot cancelled" })),
        )
            .into_response(),
        Err(e) => booking_error_to_response(e),
    }
}
