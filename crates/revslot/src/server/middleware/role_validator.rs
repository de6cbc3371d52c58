//! Role checks layered on top of the bearer-token validator.

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::auth::{AuthUser, UserRole};
use crate::server::types::ApiErrorType;

/// Restricts a route to faculty callers. Must run after `require_user`.
pub async fn require_faculty(req: Request, next: Next) -> Response {
    match req.extensions().get::<AuthUser>() {
        Some(user) if user.role == UserRole::Faculty => next.run(req).await,
        Some(_) => ApiErrorType::from((
            StatusCode::FORBIDDEN,
            "Faculty access required",
            None,
        ))
        .into_response(),
        None => ApiErrorType::from((
            StatusCode::UNAUTHORIZED,
            "Missing bearer token",
            None,
        ))
        .into_response(),
    }
}
