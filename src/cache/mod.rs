//! Cache Module
//!
//! Key generation and the typed accessor with TTL policy.

mod accessor;
mod key;
mod stats;
mod ttl;
mod value;


// Re-export public types
pub use accessor::Cache;
pub use key::{generate_key, key_text, KeyPart};
pub use stats::CacheStats;
pub use ttl::{SetOption, TtlPolicy};

// == Public Constants ==
/// Length of every generated key in hex characters
pub const KEY_LENGTH: usize = 40;
