//! Server-side sessions stored in the cache.

use crate::{cache_key, Cache, CacheError};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::marker::PhantomData;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new cryptographically secure session ID.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the string has the shape of a generated ID.
    pub fn is_well_formed(id: &str) -> bool {
        id.strip_prefix("sess_")
            .map(|rest| {
                rest.len() == 24
                    && rest
                        .bytes()
                        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
            })
            .unwrap_or(false)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session data stored in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData<T> {
    pub id: SessionId,
    pub data: T,
    /// Bumped on every write.
    pub version: u64,
    /// Unix seconds.
    pub created_at: u64,
    /// Unix seconds.
    pub last_accessed: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Session store with a sliding expiry.
///
/// Every successful [`Session::get`] pushes the expiry `ttl` into the future.
///
/// ```rust,ignore
/// let sessions = Session::<SessionUser>::new(cache, Duration::from_secs(3600));
/// let id = sessions.create(&user)?;
/// let user = sessions.get(&id)?;
/// sessions.delete(&id);
/// ```
#[derive(Debug, Clone)]
pub struct Session<T> {
    cache: Cache,
    ttl: Duration,
    _data: PhantomData<fn() -> T>,
}

impl<T> Session<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Create a session store over `cache`.
    pub fn new(cache: Cache, ttl: Duration) -> Self {
        Self {
            cache,
            ttl,
            _data: PhantomData,
        }
    }

    /// The configured lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a new session holding `data`.
    pub fn create(&self, data: &T) -> Result<SessionId, CacheError> {
        let id = SessionId::generate();
        let now = unix_now();
        let session = SessionData {
            id: id.clone(),
            data: data.clone(),
            version: 1,
            created_at: now,
            last_accessed: now,
        };
        self.cache
            .set_with_ttl(&self.session_key(&id), &session, self.ttl)?;
        debug!(session = %id, "session created");
        Ok(id)
    }

    /// Get session data if it exists, refreshing its expiry.
    pub fn get(&self, id: &SessionId) -> Result<Option<T>, CacheError> {
        Ok(self.touch(id)?.map(|s| s.data))
    }

    /// Get full session data including version.
    pub fn get_versioned(&self, id: &SessionId) -> Result<Option<SessionData<T>>, CacheError> {
        self.cache.get(&self.session_key(id))
    }

    /// Replace session data. Returns `false` if the session is gone.
    pub fn set(&self, id: &SessionId, data: &T) -> Result<bool, CacheError> {
        let key = self.session_key(id);
        let Some(mut session) = self.cache.get::<SessionData<T>>(&key)? else {
            return Ok(false);
        };
        session.data = data.clone();
        session.version += 1;
        session.last_accessed = unix_now();
        self.cache.set_with_ttl(&key, &session, self.ttl)?;
        Ok(true)
    }

    /// Delete a session. Returns whether it existed.
    pub fn delete(&self, id: &SessionId) -> bool {
        let removed = self.cache.delete(&self.session_key(id));
        if removed {
            debug!(session = %id, "session destroyed");
        }
        removed
    }

    /// Check if a session exists.
    pub fn exists(&self, id: &SessionId) -> bool {
        self.cache.exists(&self.session_key(id))
    }

    fn touch(&self, id: &SessionId) -> Result<Option<SessionData<T>>, CacheError> {
        let key = self.session_key(id);
        let Some(mut session) = self.cache.get::<SessionData<T>>(&key)? else {
            return Ok(None);
        };
        session.last_accessed = unix_now();
        self.cache.set_with_ttl(&key, &session, self.ttl)?;
        Ok(Some(session))
    }

    fn session_key(&self, id: &SessionId) -> String {
        cache_key!("session", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Who {
        name: String,
    }

    fn who(name: &str) -> Who {
        Who {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_session_id_generate_format() {
        let id = SessionId::generate();
        let s = id.as_str();

        assert!(s.starts_with("sess_"));
        // Base64 encoded 18 bytes = 24 chars, plus "sess_" = 29 chars
        assert_eq!(s.len(), 29);
        assert!(SessionId::is_well_formed(s));
        assert!(!SessionId::is_well_formed("sess_short"));
        assert!(!SessionId::is_well_formed("nope"));
    }

    #[test]
    fn test_session_id_generate_uniqueness() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn test_session_id_serialization() {
        let id = SessionId::new("serialize-me");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""serialize-me""#);
        let deserialized: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn test_create_get_delete() {
        let sessions = Session::new(Cache::new(), Duration::from_secs(60));
        let id = sessions.create(&who("ada")).unwrap();

        assert_eq!(sessions.get(&id).unwrap(), Some(who("ada")));
        assert!(sessions.exists(&id));
        assert!(sessions.delete(&id));
        assert_eq!(sessions.get(&id).unwrap(), None);
        assert!(!sessions.delete(&id));
    }

    #[test]
    fn test_set_bumps_version() {
        let sessions = Session::new(Cache::new(), Duration::from_secs(60));
        let id = sessions.create(&who("ada")).unwrap();

        assert!(sessions.set(&id, &who("grace")).unwrap());
        let stored = sessions.get_versioned(&id).unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.data, who("grace"));

        assert!(!sessions.set(&SessionId::new("missing"), &who("x")).unwrap());
    }

    #[test]
    fn test_expired_session_is_gone() {
        let sessions = Session::new(Cache::new(), Duration::ZERO);
        let id = sessions.create(&who("ada")).unwrap();
        assert_eq!(sessions.get(&id).unwrap(), None);
    }
}
