//! Memory Entry Module
//!
//! Defines a stored value together with its expiry deadline.

use std::time::Duration;

use tokio::time::Instant;

// == Memory Entry ==
/// A single entry held by the memory backend.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    /// The stored bytes
    pub value: Vec<u8>,
    /// Instant the entry was written
    pub created_at: Instant,
    /// Instant after which the entry reads as absent
    pub expires_at: Instant,
}

impl MemoryEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now.
    pub fn new(value: Vec<u8>, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches the deadline.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
