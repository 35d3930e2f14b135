//! Error types for the cache accessor
//!
//! Provides unified error handling using thiserror. A cache miss is never an
//! error: getters report it as `Ok(None)`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value is present but cannot be read as the requested scalar type
    #[error("Type mismatch for key {key}: expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Transport or server-reported failure from Redis
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The ring has no shard to route the key to
    #[error("No cache shards configured")]
    NoShards,
}

impl CacheError {
    // == Classification ==
    /// Returns true for failures that come from the backing store itself.
    pub fn is_backend(&self) -> bool {
        matches!(self, CacheError::Redis(_) | CacheError::NoShards)
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
