//! Keyed TTL cache.
//!
//! A bounded map from key to value with per-entry creation timestamps.
//! Entries older than the cache TTL are treated as absent and removed
//! lazily on the `get` that observes them; capacity overflow evicts the
//! least-recently-used entry regardless of age. Operations never fail.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use lru::LruCache;
use metrics::counter;

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::ttl";

struct Slot<V> {
    value: V,
    created_at: Instant,
}

impl<V> Slot<V> {
    fn fresh(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    fn expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Bounded LRU map with a fixed time-to-live.
///
/// Interior locking keeps `get`/`insert`/`remove` safe across threads; a
/// single coarse lock per instance is sufficient at expected load.
pub struct TtlCache<K: Hash + Eq, V: Clone> {
    name: &'static str,
    entries: RwLock<LruCache<K, Slot<V>>>,
    ttl: Duration,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    pub fn new(name: &'static str, capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            name,
            entries: RwLock::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Look up a live entry, refreshing its LRU recency.
    ///
    /// An entry older than the TTL is removed and reported as absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let expired = match entries.get(key) {
            Some(slot) if !slot.expired(self.ttl) => {
                counter!("plaza_cache_hit_total", "cache" => self.name).increment(1);
                return Some(slot.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
            counter!("plaza_cache_expired_total", "cache" => self.name).increment(1);
        }
        counter!("plaza_cache_miss_total", "cache" => self.name).increment(1);
        None
    }

    /// Insert or replace an entry, resetting its creation timestamp.
    pub fn insert(&self, key: K, value: V) {
        let mut entries = rw_write(&self.entries, SOURCE, "insert");
        if let Some((evicted, _)) = entries.push(key, Slot::fresh(value))
            && !entries.contains(&evicted)
        {
            counter!("plaza_cache_evict_total", "cache" => self.name).increment(1);
        }
    }

    /// Replace a live entry with `f(current)` under the write lock.
    ///
    /// The whole record is swapped, never field-mutated in place, and the
    /// rewrite resets the entry's creation timestamp. Expired or absent
    /// entries are left untouched and reported as `false`.
    pub fn update<F>(&self, key: K, f: F) -> bool
    where
        F: FnOnce(V) -> V,
    {
        let mut entries = rw_write(&self.entries, SOURCE, "update");
        match entries.pop(&key) {
            Some(slot) if !slot.expired(self.ttl) => {
                entries.put(key, Slot::fresh(f(slot.value)));
                true
            }
            _ => false,
        }
    }

    /// Remove an entry; returns whether one was present.
    pub fn remove(&self, key: &K) -> bool {
        rw_write(&self.entries, SOURCE, "remove").pop(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }

    /// Number of stored entries, expired ones included until observed.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
