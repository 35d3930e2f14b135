//! Backend Module
//!
//! The remote key-value store seen through a byte-level interface.
//!
//! # Backends
//! - [`RedisRing`]: Redis shards addressed by rendezvous hashing
//! - [`MemoryBackend`]: in-process TTL store for tests and local runs

mod entry;
mod memory;
mod ring;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use entry::MemoryEntry;
pub use memory::MemoryBackend;
pub use ring::{RedisRing, RingAuth};

// == Cache Backend Trait ==
/// Byte-level operations the accessor needs from a store.
///
/// A miss is `Ok(None)`, never an error. Implementations make one round trip
/// per call and never retry.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetches the raw bytes stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Short name used in logs.
    fn backend_type(&self) -> &'static str;
}
