//! TTL Policy Module
//!
//! Holds the default time-to-live shared by every clone of an accessor and
//! resolves per-call overrides against it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;

// == Set Option ==
/// Per-call option for a set operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SetOption {
    /// Expire this entry after the given duration instead of the default
    Expiration(TimeDelta),
}

// == TTL Policy ==
/// Default TTL shared between accessor clones.
///
/// Reads and writes are relaxed: a concurrent setter wins whenever it lands.
#[derive(Debug, Clone)]
pub struct TtlPolicy {
    default_nanos: Arc<AtomicU64>,
}

impl TtlPolicy {
    /// Creates a policy with the given default, which must be non-zero.
    ///
    /// A zero duration falls back to one nanosecond so the default stays positive.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_nanos: Arc::new(AtomicU64::new(duration_to_nanos(default_ttl).max(1))),
        }
    }

    /// Returns the current default TTL.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_nanos(self.default_nanos.load(Ordering::Relaxed))
    }

    /// Replaces the default TTL going forward.
    ///
    /// Zero or negative values are ignored and return false.
    pub fn set_default_ttl(&self, ttl: TimeDelta) -> bool {
        match positive(ttl) {
            Some(ttl) => {
                self.default_nanos
                    .store(duration_to_nanos(ttl), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Picks the TTL for a single set call.
    ///
    /// The first positive `Expiration` option wins; otherwise the current default.
    pub fn resolve(&self, options: &[SetOption]) -> Duration {
        options
            .iter()
            .find_map(|option| match option {
                SetOption::Expiration(ttl) => positive(*ttl),
            })
            .unwrap_or_else(|| self.default_ttl())
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::DEFAULT_TTL_SECS))
    }
}

fn positive(ttl: TimeDelta) -> Option<Duration> {
    if ttl <= TimeDelta::zero() {
        return None;
    }
    ttl.to_std().ok()
}

fn duration_to_nanos(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_one_minute() {
        let policy = TtlPolicy::default();
        assert_eq!(policy.default_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_set_default_ttl() {
        let policy = TtlPolicy::default();
        assert!(policy.set_default_ttl(TimeDelta::minutes(2)));
        assert_eq!(policy.default_ttl(), Duration::from_secs(120));
    }

    #[test]
    fn test_negative_default_ignored() {
        let policy = TtlPolicy::new(Duration::from_secs(30));
        assert!(!policy.set_default_ttl(TimeDelta::seconds(-5)));
        assert_eq!(policy.default_ttl(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_default_ignored() {
        let policy = TtlPolicy::new(Duration::from_secs(30));
        assert!(!policy.set_default_ttl(TimeDelta::zero()));
        assert_eq!(policy.default_ttl(), Duration::from_secs(30));
    }

    #[test]
    fn test_zero_constructor_stays_positive() {
        let policy = TtlPolicy::new(Duration::ZERO);
        assert!(policy.default_ttl() > Duration::ZERO);
    }

    #[test]
    fn test_resolve_without_options_uses_default() {
        let policy = TtlPolicy::new(Duration::from_secs(30));
        assert_eq!(policy.resolve(&[]), Duration::from_secs(30));
    }

    #[test]
    fn test_resolve_override_does_not_touch_default() {
        let policy = TtlPolicy::new(Duration::from_secs(30));
        let ttl = policy.resolve(&[SetOption::Expiration(TimeDelta::seconds(5))]);

        assert_eq!(ttl, Duration::from_secs(5));
        assert_eq!(policy.default_ttl(), Duration::from_secs(30));
    }

    #[test]
    fn test_resolve_skips_non_positive_override() {
        let policy = TtlPolicy::new(Duration::from_secs(30));
        let ttl = policy.resolve(&[
            SetOption::Expiration(TimeDelta::seconds(-1)),
            SetOption::Expiration(TimeDelta::seconds(7)),
        ]);
        assert_eq!(ttl, Duration::from_secs(7));

        let ttl = policy.resolve(&[SetOption::Expiration(TimeDelta::zero())]);
        assert_eq!(ttl, Duration::from_secs(30));
    }

    #[test]
    fn test_clones_share_default() {
        let policy = TtlPolicy::default();
        let clone = policy.clone();
        clone.set_default_ttl(TimeDelta::seconds(10));
        assert_eq!(policy.default_ttl(), Duration::from_secs(10));
    }
}
