//! Bearer-token validation middleware.

use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use tracing::warn;

use crate::auth::AuthError;
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Resolves the caller's bearer token and attaches the authenticated user
/// to the request. Requests without a valid token never reach a handler.
pub async fn require_user(
    State(s): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&req) {
        Some(token) => token,
        None => {
            return ApiErrorType::from((
                StatusCode::UNAUTHORIZED,
                "Missing bearer token",
                None,
            ))
            .into_response();
        }
    };

    match s.auth.resolve_token(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(AuthError::Unauthorized) => ApiErrorType::from((
            StatusCode::UNAUTHORIZED,
            "Invalid or expired token",
            None,
        ))
        .into_response(),
        Err(e) => {
            warn!("Identity resolution failed: {}", e);
            ApiErrorType::from((
                StatusCode::BAD_GATEWAY,
                "Identity service unavailable",
                Some(e.to_string()),
            ))
            .into_response()
        }
    }
}

fn bearer_token(req: &Request) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}
