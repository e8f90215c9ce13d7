//! Cache configuration.
//!
//! Capacities and TTLs for the three in-process caches, set via `plaza.toml`.
//! The TTLs double as the documented staleness bounds: after a logout, a
//! cached credential can appear valid for at most the corresponding TTL.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_TOKEN_CAPACITY: usize = 10_000;
const DEFAULT_TOKEN_TTL_SECS: u64 = 300;
const DEFAULT_SESSION_CAPACITY: usize = 5_000;
const DEFAULT_SESSION_TTL_SECS: u64 = 600;
const DEFAULT_STATS_CAPACITY: usize = 2_000;
const DEFAULT_STATS_TTL_SECS: u64 = 30;

/// Cache configuration from `plaza.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum verified-token entries in the auth cache.
    pub token_capacity: usize,
    /// Seconds a verified token outcome stays usable.
    pub token_ttl_secs: u64,
    /// Maximum hydrated sessions in the auth cache.
    pub session_capacity: usize,
    /// Seconds a hydrated session stays usable.
    pub session_ttl_secs: u64,
    /// Maximum statistics records in the client stats cache.
    pub stats_capacity: usize,
    /// Seconds a statistics record stays usable.
    pub stats_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            token_capacity: DEFAULT_TOKEN_CAPACITY,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            session_capacity: DEFAULT_SESSION_CAPACITY,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            stats_capacity: DEFAULT_STATS_CAPACITY,
            stats_ttl_secs: DEFAULT_STATS_TTL_SECS,
        }
    }
}

impl CacheConfig {
    /// Returns the token capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn token_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.token_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the session capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn session_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.session_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    /// Returns the stats capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn stats_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.stats_capacity).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn stats_ttl(&self) -> Duration {
        Duration::from_secs(self.stats_ttl_secs)
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            token_capacity: settings.token_capacity,
            token_ttl_secs: settings.token_ttl_secs,
            session_capacity: settings.session_capacity,
            session_ttl_secs: settings.session_ttl_secs,
            stats_capacity: settings.stats_capacity,
            stats_ttl_secs: settings.stats_ttl_secs,
        }
    }
}
