//! Key-Value store with automatic serialization and expiry.

use crate::CacheError;
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map(|at| at > now).unwrap_or(true)
    }
}

/// Type-safe in-process cache.
///
/// Values are stored as JSON, so anything that implements `Serialize` and
/// `DeserializeOwned` can go in. Clones share the same storage. Expired keys
/// read as missing and are dropped lazily or by [`Cache::purge_expired`].
#[derive(Debug, Clone, Default)]
pub struct Cache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    default_ttl: Option<Duration>,
}

impl Cache {
    /// Create an empty cache whose entries never expire by default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache whose entries expire after `ttl` by default.
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::default(),
            default_ttl: Some(ttl),
        }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    ///
    /// ```rust,ignore
    /// let user: Option<SessionUser> = cache.get("session:sess_abc")?;
    /// ```
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => {
                    return Ok(Some(serde_json::from_slice(&entry.bytes)?));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: drop it unless a writer replaced it in between.
        let mut entries = self.entries.write();
        if entries.get(key).map(|e| !e.is_live(now)).unwrap_or(false) {
            entries.remove(key);
            trace!(key, "expired entry dropped");
        }
        Ok(None)
    }

    /// Set a value with the default TTL.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        self.store(key, value, self.default_ttl)
    }

    /// Set a value that expires after `ttl`.
    pub fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        self.store(key, value, Some(ttl))
    }

    fn store<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        let expires_at = match ttl {
            Some(ttl) => Some(Instant::now().checked_add(ttl).ok_or_else(|| {
                CacheError::StoreError(format!("ttl out of range: {:?}", ttl))
            })?),
            None => None,
        };
        self.entries
            .write()
            .insert(key.to_string(), Entry { bytes, expires_at });
        Ok(())
    }

    /// Delete a value from the cache. Returns whether a live value was removed.
    pub fn delete(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .write()
            .remove(key)
            .map(|e| e.is_live(now))
            .unwrap_or(false)
    }

    /// Check if a live key exists in the cache.
    pub fn exists(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .map(|e| e.is_live(now))
            .unwrap_or(false)
    }

    /// All live keys with the given prefix.
    pub fn keys(&self, prefix: &str) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .read()
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Drop every expired entry. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("session", session_id);
/// // Returns "session:sess_abc"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let cache = Cache::new();
        cache.set("k", &vec![1, 2, 3]).unwrap();
        assert_eq!(cache.get::<Vec<i32>>("k").unwrap(), Some(vec![1, 2, 3]));
        assert!(cache.exists("k"));
        assert!(cache.delete("k"));
        assert!(!cache.delete("k"));
        assert_eq!(cache.get::<Vec<i32>>("k").unwrap(), None);
    }

    #[test]
    fn test_expired_entries_read_as_missing() {
        let cache = Cache::new();
        cache.set_with_ttl("short", &"x", Duration::ZERO).unwrap();
        cache.set("long", &"y").unwrap();

        assert_eq!(cache.get::<String>("short").unwrap(), None);
        assert!(!cache.exists("short"));
        assert_eq!(cache.keys(""), vec!["long".to_string()]);
    }

    #[test]
    fn test_purge_expired() {
        let cache = Cache::with_default_ttl(Duration::ZERO);
        cache.set("a", &1).unwrap();
        cache.set("b", &2).unwrap();
        cache.set_with_ttl("c", &3, Duration::from_secs(60)).unwrap();
        assert_eq!(cache.purge_expired(), 2);
        assert_eq!(cache.get::<i32>("c").unwrap(), Some(3));
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = Cache::new();
        let other = cache.clone();
        cache.set("shared", &true).unwrap();
        assert_eq!(other.get::<bool>("shared").unwrap(), Some(true));
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let cache = Cache::new();
        cache.set("n", &"text").unwrap();
        assert!(matches!(
            cache.get::<i64>("n"),
            Err(CacheError::SerializeError(_))
        ));
    }

    #[test]
    fn test_cache_key_macro() {
        assert_eq!(cache_key!("session", "abc"), "session:abc");
        assert_eq!(cache_key!("cart", "u1", 2), "cart:u1:2");
    }
}
