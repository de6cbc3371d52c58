//! Client for the identity collaborator.
//!
//! The service trusts an external identity provider to map bearer tokens to
//! internal users. Resolution results are cached briefly so a burst of
//! requests from one session costs a single upstream call.

pub mod cache;
mod error;

pub use error::AuthError;

use cache::{IdentityCache, TokenKey};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Path on the identity service that resolves a bearer token.
const RESOLVE_PATH: &str = "/identity/resolve";

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Faculty,
    Student,
}

/// An authenticated caller as resolved by the identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: String,
    pub role: UserRole,
}

/// Configuration for the identity client.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the identity service
    pub base_url: String,
    /// Connect timeout for identity calls
    pub connect_timeout: Duration,
    /// Overall request timeout for identity calls
    pub request_timeout: Duration,
    /// How long resolved identities stay cached
    pub cache_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4000".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(5 * 60),
        }
    }
}

/// Client for resolving bearer tokens against the identity service.
pub struct AuthClient {
    client: Client,
    config: AuthConfig,
    cache: IdentityCache,
}

impl AuthClient {
    /// Creates a new identity client, validating the configured base URL.
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        Url::parse(&config.base_url)?;

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AuthError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let cache = IdentityCache::new(config.cache_ttl);

        Ok(Self {
            client,
            config,
            cache,
        })
    }

    /// Resolves a bearer token to an authenticated user, using the cache
    /// when possible.
    ///
    /// # Returns
    /// * `Ok(AuthUser)` - the caller's internal id and role
    /// * `Err(AuthError::Unauthorized)` - the identity service rejected the
    ///   token
    pub async fn resolve_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let key = TokenKey::from_token(token);

        if let Some(user) = self.cache.get(&key) {
            debug!(token = %key, "Identity cache hit");
            return Ok(user);
        }

        let url = format!("{}{}", self.config.base_url, RESOLVE_PATH);
        let response = self.client.get(&url).bearer_auth(token).send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::Unauthorized),
            status if status.is_success() => {
                let user: AuthUser =
                    response
                        .json()
                        .await
                        .map_err(|e| AuthError::UnexpectedResponse {
                            message: format!("Malformed identity payload: {}", e),
                        })?;

                info!(token = %key, user_id = %user.user_id, "Resolved identity");
                self.cache.insert(key, user.clone());
                Ok(user)
            }
            status => Err(AuthError::UnexpectedResponse {
                message: format!("Identity service returned {}", status),
            }),
        }
    }
}
