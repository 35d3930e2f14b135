//! Ring Cache - Deterministic cache keys and typed accessors over Redis
//!
//! Keys are SHA-1 digests of ordered argument lists; values are stored as JSON
//! with a shared default TTL that can be overridden per call.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use backend::{CacheBackend, MemoryBackend, RedisRing};
pub use cache::{generate_key, Cache, CacheStats, KeyPart, SetOption};
pub use config::{BackendKind, Config};
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
