//! Cache Accessor Module
//!
//! Typed get/set/delete over a [`CacheBackend`], with a shared default TTL.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::backend::CacheBackend;
use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::cache::ttl::{SetOption, TtlPolicy};
use crate::cache::value;
use crate::error::Result;

// == Cache ==
/// Typed accessor over a shared backend.
///
/// Clones share the backend, the default TTL and the statistics.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn CacheBackend>,
    ttl: TtlPolicy,
    stats: Arc<StatsRecorder>,
}

impl Cache {
    // == Constructors ==
    /// Creates an accessor with the one-minute default TTL.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self::with_policy(backend, TtlPolicy::default())
    }

    /// Creates an accessor with a custom default TTL.
    pub fn with_ttl(backend: Arc<dyn CacheBackend>, default_ttl: Duration) -> Self {
        Self::with_policy(backend, TtlPolicy::new(default_ttl))
    }

    fn with_policy(backend: Arc<dyn CacheBackend>, ttl: TtlPolicy) -> Self {
        Self {
            backend,
            ttl,
            stats: Arc::new(StatsRecorder::default()),
        }
    }

    // == TTL Policy ==
    /// Replaces the default TTL for future writes. Non-positive values are ignored.
    pub fn set_default_ttl(&self, ttl: TimeDelta) {
        if !self.ttl.set_default_ttl(ttl) {
            debug!("Ignoring non-positive default TTL {}", ttl);
        }
    }

    /// Returns the current default TTL.
    pub fn default_ttl(&self) -> Duration {
        self.ttl.default_ttl()
    }

    // == Set ==
    /// Stores `value` under `key`.
    ///
    /// The TTL is the first positive [`SetOption::Expiration`] in `options`, or
    /// the current default.
    pub async fn set<T>(&self, key: &str, value: &T, options: &[SetOption]) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let ttl = self.ttl.resolve(options);
        let bytes = serde_json::to_vec(value)?;

        self.backend.set(key, bytes, ttl).await?;
        debug!(
            "Set '{}' via {} backend (ttl={:?})",
            key,
            self.backend.backend_type(),
            ttl
        );
        Ok(())
    }

    // == Typed Getters ==
    /// Reads `key` as a signed 64-bit integer. `Ok(None)` on a miss.
    pub async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        match self.get_value(key).await? {
            Some(raw) => value::to_i64(key, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Reads `key` as a string. `Ok(None)` on a miss.
    pub async fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get_value(key).await? {
            Some(raw) => value::to_string(key, raw).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the stored JSON value without coercion.
    pub async fn get_value(&self, key: &str) -> Result<Option<Value>> {
        self.load(key).await
    }

    // == Load ==
    /// Decodes the value stored under `key` into `T`. `Ok(None)` on a miss.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw = self.backend.get(key).await?;
        self.stats.record(raw.is_some());

        match raw {
            Some(bytes) => {
                debug!("Cache hit for key '{}'", key);
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            None => {
                debug!("Cache miss for key '{}'", key);
                Ok(None)
            }
        }
    }

    /// Decodes the value stored under `key` into `dest`.
    ///
    /// Returns whether the key was found; `dest` is untouched on a miss.
    pub async fn load_into<T: DeserializeOwned>(&self, key: &str, dest: &mut T) -> Result<bool> {
        match self.load(key).await? {
            Some(loaded) => {
                *dest = loaded;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // == Delete ==
    /// Removes `key`. Succeeds when the key does not exist.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.backend.delete(key).await
    }

    // == Stats ==
    /// Returns hit/miss counts for reads made through this accessor and its clones.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}
