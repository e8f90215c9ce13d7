//! Plaza in-process caching primitives.
//!
//! One generic building block, the [`TtlCache`], instantiated three times:
//!
//! - verified-token outcomes (auth hot path)
//! - hydrated user sessions (auth hot path, longer TTL)
//! - statistics records (client tier)
//!
//! Each instance is a physically separate map with its own capacity and
//! TTL from [`CacheConfig`]. Instances are constructed at process start
//! and passed to their consumers; there are no ambient globals.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! token_capacity = 10000
//! token_ttl_secs = 300
//! # ... see config.rs for all options
//! ```

mod config;
mod keys;
mod lock;
mod ttl;

pub use config::CacheConfig;
pub use keys::{StatsKey, TokenKey};
pub use ttl::TtlCache;
