/// Shared application state
use std::sync::Arc;

use crate::auth::AuthClient;
use crate::booking::BookingEngine;
use crate::config::AppConfig;
use crate::db::ReviewDbManager;

/// State shared across all request handlers.
pub struct AppState {
    /// The review slot store
    pub db: Arc<ReviewDbManager>,
    /// Publication and booking rules over the store
    pub engine: BookingEngine,
    /// Client for the identity service
    pub auth: AuthClient,
    /// Loaded configuration
    pub config: AppConfig,
}
