use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{bookings, slots, status, timetable};
use crate::server::middleware::{auth_validator, role_validator};
use crate::types::AppState;

mod endpoints;
mod middleware;
mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Routes restricted to faculty callers
    let faculty_router = Router::new()
        .route(
            "/timetable",
            post(timetable::post_timetable).get(timetable::get_timetable),
        )
        .route("/timetable/free_slots", get(timetable::get_free_slots))
        .route("/slots/publish", post(slots::post_publish_slots))
        .route("/slots/:slot_id", delete(slots::delete_slot))
        .layer(mw::from_fn(role_validator::require_faculty));

    // Routes available to any authenticated caller
    let api_router = Router::new()
        .route(
            "/slots/classroom/:classroom_id",
            get(slots::get_classroom_slots),
        )
        .route("/bookings", post(bookings::post_book_slot))
        .route("/bookings/team/:team_id", get(bookings::get_team_bookings))
        .merge(faculty_router)
        .layer(mw::from_fn_with_state(
            app_state.clone(),
            auth_validator::require_user,
        ));

    Router::new()
        .route("/health", get(status::get_health))
        .merge(api_router)
        .with_state(app_state.clone())
}
