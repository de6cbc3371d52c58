//! TTL-based caching for resolved identities.

use super::AuthUser;
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

/// A cache key derived from a bearer token.
///
/// The token is hashed so raw credentials are never held in memory longer
/// than the request that carried them.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct TokenKey(String);

impl TokenKey {
    pub fn from_token(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        let result = hasher.finalize();
        // Use first 16 bytes as hex string
        let hash = hex::encode(&result[..16]);
        Self(hash)
    }
}

impl std::fmt::Display for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show first 8 chars for privacy
        write!(f, "{}...", &self.0[..8.min(self.0.len())])
    }
}

#[derive(Clone)]
struct CachedIdentity {
    user: AuthUser,
    cached_at: Instant,
    ttl: Duration,
}

/// Thread-safe TTL cache for resolved identities.
pub struct IdentityCache {
    entries: DashMap<TokenKey, CachedIdentity>,
    default_ttl: Duration,
}

impl IdentityCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    /// Gets a cached identity if it exists and hasn't expired.
    pub fn get(&self, key: &TokenKey) -> Option<AuthUser> {
        self.entries.get(key).and_then(|entry| {
            if entry.cached_at.elapsed() < entry.ttl {
                Some(entry.user.clone())
            } else {
                drop(entry);
                self.entries.remove(key);
                None
            }
        })
    }

    pub fn insert(&self, key: TokenKey, user: AuthUser) {
        self.entries.insert(
            key,
            CachedIdentity {
                user,
                cached_at: Instant::now(),
                ttl: self.default_ttl,
            },
        );
    }

    /// Removes expired entries; call periodically for proactive cleanup.
    pub fn cleanup_expired(&self) {
        self.entries
            .retain(|_, entry| entry.cached_at.elapsed() < entry.ttl);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Helper module for hex encoding (avoiding extra dependency).
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;

    fn user(id: &str) -> AuthUser {
        AuthUser {
            user_id: id.to_string(),
            role: UserRole::Student,
        }
    }

    #[test]
    fn test_token_key_hashing() {
        let key1 = TokenKey::from_token("token123");
        let key2 = TokenKey::from_token("token123");
        let key3 = TokenKey::from_token("token456");

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
    }

    #[test]
    fn test_cache_round_trip() {
        let cache = IdentityCache::new(Duration::from_secs(60));
        let key = TokenKey::from_token("token123");

        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), user("u-1"));
        assert_eq!(cache.get(&key).unwrap().user_id, "u-1");
    }

    #[test]
    fn test_expired_entries_evicted() {
        let cache = IdentityCache::new(Duration::ZERO);
        let key = TokenKey::from_token("token123");

        cache.insert(key.clone(), user("u-1"));
        assert!(cache.get(&key).is_none());
        assert!(cache.is_empty());
    }
}
