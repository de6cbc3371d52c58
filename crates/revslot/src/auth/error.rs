//! Error types for identity resolution.

use thiserror::Error;

/// Errors that can occur while resolving a caller against the identity
/// service.
#[derive(Debug, Error, Clone)]
pub enum AuthError {
    /// Network/HTTP request to the identity service failed
    #[error("Identity service error: {message}")]
    Network { message: String },

    /// The token was rejected by the identity service
    #[error("Invalid or expired token")]
    Unauthorized,

    /// The identity service returned something unexpected
    #[error("Unexpected identity response: {message}")]
    UnexpectedResponse { message: String },

    /// Identity service URL was malformed
    #[error("Identity URL error: {message}")]
    UrlError { message: String },
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for AuthError {
    fn from(err: url::ParseError) -> Self {
        AuthError::UrlError {
            message: err.to_string(),
        }
    }
}
