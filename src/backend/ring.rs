//! Redis Ring Module
//!
//! Spreads keys over several Redis servers. Each key goes to the shard with
//! the highest rendezvous score, so adding or removing a shard only moves the
//! keys that belonged to it.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, IntoConnectionInfo};
use sha1::{Digest, Sha1};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::CacheBackend;
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Credentials and database applied to every shard.
#[derive(Debug, Clone, Default)]
pub struct RingAuth {
    pub username: Option<String>,
    pub password: Option<String>,
    /// Overrides any database index given in the shard address
    pub db: Option<i64>,
}

// == Shard ==
struct Shard {
    name: String,
    addr: String,
    client: Client,
    /// Connected on first use so unreachable servers never fail startup
    conn: OnceCell<ConnectionManager>,
}

impl Shard {
    fn open(name: &str, addr: &str, auth: &RingAuth) -> Result<Self> {
        let url = if addr.contains("://") {
            addr.to_string()
        } else {
            format!("redis://{}", addr)
        };

        let mut info = url.as_str().into_connection_info()?;
        if let Some(db) = auth.db {
            info.redis.db = db;
        }
        if auth.username.is_some() {
            info.redis.username = auth.username.clone();
        }
        if auth.password.is_some() {
            info.redis.password = auth.password.clone();
        }

        Ok(Self {
            name: name.to_string(),
            addr: addr.to_string(),
            client: Client::open(info)?,
            conn: OnceCell::new(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                info!("Connecting to cache shard {} at {}", self.name, self.addr);
                // One attempt per call; failures surface to the caller
                let config = ConnectionManagerConfig::new().set_number_of_retries(0);
                ConnectionManager::new_with_config(self.client.clone(), config).await
            })
            .await
            .map_err(|e| {
                warn!("Cache shard {} at {} unreachable: {}", self.name, self.addr, e);
                CacheError::from(e)
            })?;
        Ok(conn.clone())
    }
}

// == Redis Ring ==
/// Redis backend sharded over the configured servers.
pub struct RedisRing {
    shards: Vec<Shard>,
}

impl RedisRing {
    // == Constructor ==
    /// Builds a ring from a `label -> address` map.
    ///
    /// No connection is made here. An empty map is accepted; every operation
    /// on it fails with [`CacheError::NoShards`].
    pub fn new(shards: &BTreeMap<String, String>, auth: &RingAuth) -> Result<Self> {
        let shards = shards
            .iter()
            .map(|(name, addr)| Shard::open(name, addr, auth))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { shards })
    }

    /// Builds a ring from the addresses and credentials in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let auth = RingAuth {
            username: config.username.clone(),
            password: config.password.clone(),
            db: config.db,
        };
        Self::new(&config.shards(), &auth)
    }

    // == Shard Selection ==
    /// Returns the label of the shard that owns `key`.
    pub fn shard_name_for(&self, key: &str) -> Option<&str> {
        self.shard_for(key).ok().map(|shard| shard.name.as_str())
    }

    /// Number of configured shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_for(&self, key: &str) -> Result<&Shard> {
        self.shards
            .iter()
            .max_by_key(|shard| rendezvous_score(&shard.name, key))
            .ok_or(CacheError::NoShards)
    }
}

fn rendezvous_score(shard: &str, key: &str) -> u64 {
    let mut hasher = Sha1::new();
    hasher.update(shard.as_bytes());
    hasher.update(b":");
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();

    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

#[async_trait]
impl CacheBackend for RedisRing {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let shard = self.shard_for(key)?;
        let mut conn = shard.connection().await?;

        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!("Redis GET failed for '{}' on {}: {}", key, shard.name, e);
                CacheError::from(e)
            })?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let shard = self.shard_for(key)?;
        let mut conn = shard.connection().await?;
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);

        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!("Redis SET failed for '{}' on {}: {}", key, shard.name, e);
                CacheError::from(e)
            })?;

        debug!("Stored '{}' on {} with TTL {}ms", key, shard.name, ttl_ms);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let shard = self.shard_for(key)?;
        let mut conn = shard.connection().await?;

        let deleted: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!("Redis DEL failed for '{}' on {}: {}", key, shard.name, e);
                CacheError::from(e)
            })?;

        debug!("Deleted '{}' on {}: {}", key, shard.name, deleted > 0);
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "redis"
    }
}
