//! Configuration Module
//!
//! Handles loading cache configuration from environment variables, with an
//! optional `.env` file in the working directory.

use std::collections::BTreeMap;
use std::env;

use tracing::warn;

/// Default TTL in seconds for entries stored without an explicit expiration.
pub const DEFAULT_TTL_SECS: u64 = 60;

/// Which backend the accessor is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Sharded Redis ring
    Redis,
    /// In-process TTL store
    Memory,
}

impl BackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "redis" => Some(BackendKind::Redis),
            "memory" => Some(BackendKind::Memory),
            _ => None,
        }
    }
}

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Redis shard addresses in `host:port` form, in declaration order
    pub addrs: Vec<String>,
    /// ACL username applied to every shard
    pub username: Option<String>,
    /// Password applied to every shard
    pub password: Option<String>,
    /// Redis database index, overriding any index in the addresses
    pub db: Option<i64>,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Backend selection
    pub backend: BackendKind,
    /// Memory backend sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// A `.env` file is loaded first if one exists.
    ///
    /// # Environment Variables
    /// - `REDIS_Addr` - Comma-separated shard addresses (default: empty)
    /// - `REDIS_User` - Username (default: none)
    /// - `REDIS_Passwd` - Password (default: none)
    /// - `REDIS_DB` - Database index (default: taken from each address, else 0)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 60)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `CLEANUP_INTERVAL` - Memory sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            addrs: lookup("REDIS_Addr")
                .map(|raw| parse_addrs(&raw))
                .unwrap_or_default(),
            username: lookup("REDIS_User").filter(|v| !v.is_empty()),
            password: lookup("REDIS_Passwd").filter(|v| !v.is_empty()),
            db: lookup("REDIS_DB")
                .and_then(|v| v.trim().parse().ok())
                .or(defaults.db),
            default_ttl: lookup("CACHE_DEFAULT_TTL")
                .and_then(|v| v.trim().parse().ok())
                .filter(|ttl: &u64| *ttl > 0)
                .unwrap_or(defaults.default_ttl),
            backend: lookup("CACHE_BACKEND")
                .and_then(|v| BackendKind::parse(&v))
                .unwrap_or(defaults.backend),
            cleanup_interval: lookup("CLEANUP_INTERVAL")
                .and_then(|v| v.trim().parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Returns the shard map, labelling each address `server<N>` by position.
    ///
    /// An empty map is allowed; it only produces a warning.
    pub fn shards(&self) -> BTreeMap<String, String> {
        if self.addrs.is_empty() {
            warn!(
                configuration = ?self.addrs,
                "Redis configuration is possibly not set (REDIS_Addr is empty)"
            );
        }

        self.addrs
            .iter()
            .enumerate()
            .map(|(i, addr)| (format!("server{}", i), addr.clone()))
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addrs: Vec::new(),
            username: None,
            password: None,
            db: None,
            default_ttl: DEFAULT_TTL_SECS,
            backend: BackendKind::Redis,
            cleanup_interval: 1,
        }
    }
}

fn parse_addrs(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|addr| !addr.is_empty())
        .map(str::to_string)
        .collect()
}
