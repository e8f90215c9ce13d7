//! Client-tier statistics cache.
//!
//! Memoizes [`StatsRecord`]s by `(kind, id)` across view re-renders and
//! coalesces concurrent fetches for the same key into a single underlying
//! request: callers arriving while a fetch is in flight attach to the
//! same shared future instead of issuing their own.
//!
//! Mutation-versus-fetch policy: the fetch is the source of truth. A
//! fetch's resolution overwrites whatever the cache holds, including
//! optimistic mutations applied while it was in flight; a mutation
//! applied strictly after settlement wins until the next fetch. There is
//! no cancellation; a fetch whose caller went away still settles and
//! populates the cache for whoever asks next.

mod http;

pub use http::HttpStatsFetcher;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use metrics::counter;
use thiserror::Error;
use uuid::Uuid;

use plaza_api_types::StatsRecord;

use crate::cache::{CacheConfig, StatsKey, TtlCache};
use crate::domain::content::ContentKind;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("stats endpoint returned status {status}")]
    Status { status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed stats response: {0}")]
    Decode(String),
    #[error("stats response missing requested item")]
    MissingItem,
}

/// The one network seam of the client tier.
#[async_trait]
pub trait StatsFetcher: Send + Sync {
    async fn fetch_stats(&self, kind: ContentKind, id: Uuid) -> Result<StatsRecord, FetchError>;
}

type SharedFetch = Shared<BoxFuture<'static, Result<StatsRecord, Arc<FetchError>>>>;

struct PendingFetch {
    seq: u64,
    fetch: SharedFetch,
}

pub struct ClientStatsCache {
    records: TtlCache<StatsKey, StatsRecord>,
    pending: DashMap<StatsKey, PendingFetch>,
    fetcher: Arc<dyn StatsFetcher>,
    seq: AtomicU64,
}

impl ClientStatsCache {
    pub fn new(config: &CacheConfig, fetcher: Arc<dyn StatsFetcher>) -> Self {
        Self {
            records: TtlCache::new(
                "client_stats",
                config.stats_capacity_non_zero(),
                config.stats_ttl(),
            ),
            pending: DashMap::new(),
            fetcher,
            seq: AtomicU64::new(0),
        }
    }

    /// Return the statistics record for one item, fetching at most once
    /// per burst of concurrent callers.
    ///
    /// Fresh cache entries resolve immediately. Otherwise the caller
    /// either attaches to the in-flight fetch for this key or creates
    /// one; the entry-level lock makes the check-then-create atomic, so
    /// two racing callers can never both start a fetch. On settlement the
    /// result is written through on success, the cache is left untouched
    /// on failure, and the pending entry is dropped either way.
    pub async fn fetch(
        &self,
        kind: ContentKind,
        id: Uuid,
    ) -> Result<StatsRecord, Arc<FetchError>> {
        let key = StatsKey::new(kind, id);
        if let Some(record) = self.records.get(&key) {
            return Ok(record);
        }

        let (seq, fetch) = match self.pending.entry(key) {
            Entry::Occupied(entry) => {
                counter!("plaza_client_fetch_coalesced_total").increment(1);
                (entry.get().seq, entry.get().fetch.clone())
            }
            Entry::Vacant(vacant) => {
                // the miss above may have raced a settling fetch that
                // already wrote the record; re-check under the entry lock
                if let Some(record) = self.records.get(&key) {
                    return Ok(record);
                }
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                let fetcher = Arc::clone(&self.fetcher);
                let fetch: SharedFetch = async move {
                    fetcher.fetch_stats(kind, id).await.map_err(Arc::new)
                }
                .boxed()
                .shared();
                vacant.insert(PendingFetch {
                    seq,
                    fetch: fetch.clone(),
                });
                counter!("plaza_client_fetch_issued_total").increment(1);
                (seq, fetch)
            }
        };

        let result = fetch.await;

        // Settlement bookkeeping runs in every attached caller and is
        // idempotent; the seq guard keeps an old settle from removing a
        // newer in-flight fetch for the same key.
        if let Ok(record) = &result {
            self.records.insert(key, *record);
        }
        self.pending
            .remove_if(&key, |_, pending| pending.seq == seq);

        result
    }

    /// Synchronous cache read with no fetch side effects.
    pub fn cached(&self, kind: ContentKind, id: Uuid) -> Option<StatsRecord> {
        self.records.get(&StatsKey::new(kind, id))
    }

    /// Optimistically rewrite the cached record for immediate UI
    /// feedback, without a round trip.
    ///
    /// Applies only when a live entry exists (`false` otherwise) and
    /// refreshes that entry's TTL; the next authoritative fetch
    /// supersedes it.
    pub fn apply_local_mutation<F>(&self, kind: ContentKind, id: Uuid, mutate: F) -> bool
    where
        F: FnOnce(StatsRecord) -> StatsRecord,
    {
        self.records.update(StatsKey::new(kind, id), mutate)
    }

    /// Force the next `fetch` for this key past the cache.
    pub fn invalidate(&self, kind: ContentKind, id: Uuid) {
        self.records.remove(&StatsKey::new(kind, id));
    }
}

/// Standard like-toggle rewrite fed by the toggle endpoint's response.
pub fn apply_like_toggle(record: StatsRecord, liked: bool, new_count: u64) -> StatsRecord {
    StatsRecord {
        like_count: new_count,
        is_liked: liked,
        ..record
    }
}
