//! Type-safe in-process key-value cache for Stockroom.
//!
//! Values are stored as JSON with an optional time-to-live. Sessions are
//! built on top of the same cache.
//!
//! # Example
//!
//! ```rust,ignore
//! use stockroom_cache::Cache;
//! use std::time::Duration;
//!
//! let cache = Cache::new();
//!
//! // Store a value for five minutes
//! cache.set_with_ttl("stats:inventory", &stats, Duration::from_secs(300))?;
//!
//! // Retrieve a value
//! let stats: Option<InventoryStats> = cache.get("stats:inventory")?;
//!
//! // Delete a value
//! cache.delete("stats:inventory");
//! ```

mod error;
mod kv;
mod session;

pub use error::CacheError;
pub use kv::Cache;
pub use session::{Session, SessionData, SessionId};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cache_key, Cache, CacheError, Session, SessionId};
}
