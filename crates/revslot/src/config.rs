/// Service configuration
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::auth::AuthConfig;

/// Top-level configuration, loaded from a JSON file with defaults for every
/// field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the server binds to
    pub address: String,
    /// Port the server binds to
    pub port: u16,
    /// Path to the SQLite database file
    pub db_path: String,
    /// Base URL of the identity service
    pub identity_base_url: String,
    /// How long resolved identities stay cached, in seconds
    pub identity_cache_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            db_path: "review.db".to_string(),
            identity_base_url: "http://127.0.0.1:4000".to_string(),
            identity_cache_ttl_secs: 5 * 60,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a JSON file.
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - parsed configuration
    /// * `Err` - if the file can't be read or parsed
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Builds the identity-client configuration from these settings.
    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            base_url: self.identity_base_url.clone(),
            cache_ttl: Duration::from_secs(self.identity_cache_ttl_secs),
            ..AuthConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"port": 9090}"#).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.address, "127.0.0.1");
        assert_eq!(config.db_path, "review.db");
    }
}
