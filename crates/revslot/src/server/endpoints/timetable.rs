//! API endpoints for timetable upload and free-slot derivation.

use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::auth::AuthUser;
use crate::server::types::ApiErrorType;
use crate::timetable::{parse_timetable, split_all_slots_by_duration, TimetableError};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct TimetableUpload {
    /// Raw tab-separated timetable text as pasted by the faculty member
    pub data: String,
}

/// Query parameters for candidate-slot derivation.
#[derive(Debug, Deserialize)]
pub struct FreeSlotParams {
    /// Review duration in minutes; must be positive
    pub duration: i64,
}

fn timetable_error_to_response(error: TimetableError) -> Response {
    ApiErrorType::from((
        StatusCode::BAD_REQUEST,
        "Could not parse timetable",
        Some(error.to_string()),
    ))
    .into_response()
}

/// POST /timetable
///
/// Parses the pasted timetable, stores the raw text for the caller, and
/// returns the derived per-day free slots. A grid that fails to parse is
/// rejected whole; nothing is stored.
pub async fn post_timetable(
    State(s): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<TimetableUpload>,
) -> Response {
    info!("POST /timetable ({} bytes)", body.data.len());

    let schedule = match parse_timetable(&body.data) {
        Ok(schedule) => schedule,
        Err(e) => return timetable_error_to_response(e),
    };

    if let Err(e) = s.db.save_timetable(&user.user_id, &body.data) {
        error!("Failed to store timetable: {}", e);
        return ApiErrorType::from((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to store timetable",
            Some(e.to_string()),
        ))
        .into_response();
    }

    (StatusCode::OK, Json(schedule)).into_response()
}

/// GET /timetable
///
/// Re-parses the caller's stored timetable and returns the schedule.
pub async fn get_timetable(
    State(s): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    info!("GET /timetable");

    let raw = match s.db.load_timetable(&user.user_id) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            return ApiErrorType::from((
                StatusCode::NOT_FOUND,
                "No timetable uploaded",
                None,
            ))
            .into_response();
        }
        Err(e) => {
            error!("Failed to load timetable: {}", e);
            return ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load timetable",
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    match parse_timetable(&raw) {
        Ok(schedule) => (StatusCode::OK, Json(schedule)).into_response(),
        Err(e) => timetable_error_to_response(e),
    }
}

/// GET /timetable/free_slots?duration=N
///
/// Flattens the caller's free intervals and splits them into
/// `duration`-minute candidates. A caller without a stored timetable gets
/// an empty list.
pub async fn get_free_slots(
    State(s): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<FreeSlotParams>,
) -> Response {
    info!("GET /timetable/free_slots (duration={})", params.duration);

    // Anything outside a day's worth of minutes is a caller mistake.
    if params.duration < 1 || params.duration >= 24 * 60 {
        return timetable_error_to_response(TimetableError::InvalidDuration {
            minutes: params.duration,
        });
    }

    let raw = match s.db.load_timetable(&user.user_id) {
        Ok(Some(raw)) => raw,
        Ok(None) => return (StatusCode::OK, Json(json!([]))).into_response(),
        Err(e) => {
            error!("Failed to load timetable: {}", e);
            return ApiErrorType::from((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load timetable",
                Some(e.to_string()),
            ))
            .into_response();
        }
    };

    let candidates = parse_timetable(&raw)
        .map(|schedule| schedule.all_free_slots())
        .and_then(|slots| split_all_slots_by_duration(&slots, params.duration as u16));

    match candidates {
        Ok(slots) => (StatusCode::OK, Json(slots)).into_response(),
        Err(e) => timetable_error_to_response(e),
    }
}
