//! Memory Backend Module
//!
//! In-process store with TTL expiry. Expired entries read as misses and are
//! removed lazily on access or by the periodic sweep task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CacheBackend, MemoryEntry};
use crate::error::Result;

// == Memory Backend ==
/// Shared in-memory backend. Clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included until swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    /// Returns true if no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    // == Remaining TTL ==
    /// Returns the remaining lifetime of a live entry.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(MemoryEntry::ttl_remaining)
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it unless a writer replaced it in the meantime
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(MemoryEntry::is_expired) {
            entries.remove(key);
            debug!("Removed expired key '{}'", key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), MemoryEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[tokio::test]
    async fn test_backend_new() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.len().await, 0);
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_backend_set_and_get() {
        let backend = MemoryBackend::new();

        backend.set("key1", b"value1".to_vec(), TTL).await.unwrap();
        let value = backend.get("key1").await.unwrap();

        assert_eq!(value.as_deref(), Some(&b"value1"[..]));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn test_backend_get_nonexistent() {
        let backend = MemoryBackend::new();
        assert!(backend.get("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_backend_delete() {
        let backend = MemoryBackend::new();

        backend.set("key1", b"value1".to_vec(), TTL).await.unwrap();
        backend.delete("key1").await.unwrap();

        assert!(backend.is_empty().await);
        assert!(backend.get("key1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_backend_delete_nonexistent() {
        let backend = MemoryBackend::new();
        assert!(backend.delete("nonexistent").await.is_ok());
    }

    #[tokio::test]
    async fn test_backend_overwrite() {
        let backend = MemoryBackend::new();

        backend.set("key1", b"value1".to_vec(), TTL).await.unwrap();
        backend.set("key1", b"value2".to_vec(), TTL).await.unwrap();

        let value = backend.get("key1").await.unwrap();
        assert_eq!(value.as_deref(), Some(&b"value2"[..]));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_ttl_expiration() {
        let backend = MemoryBackend::new();

        backend
            .set("key1", b"value1".to_vec(), Duration::from_secs(1))
            .await
            .unwrap();
        assert!(backend.get("key1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_millis(1100)).await;

        assert!(backend.get("key1").await.unwrap().is_none());
        assert!(backend.is_empty().await, "Expired entry should be removed on read");
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_cleanup_expired() {
        let backend = MemoryBackend::new();

        backend
            .set("key1", b"value1".to_vec(), Duration::from_secs(1))
            .await
            .unwrap();
        backend
            .set("key2", b"value2".to_vec(), Duration::from_secs(10))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_millis(1100)).await;

        let removed = backend.cleanup_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(backend.len().await, 1);
        assert!(backend.get("key2").await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_ttl_remaining() {
        let backend = MemoryBackend::new();

        backend
            .set("key1", b"v".to_vec(), Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(
            backend.ttl_remaining("key1").await,
            Some(Duration::from_secs(10))
        );
        assert!(backend.ttl_remaining("missing").await.is_none());
    }
}
