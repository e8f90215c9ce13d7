//! Batch statistics aggregation.
//!
//! Given an arbitrary list of content refs, produce one complete
//! [`StatsRecord`] per id while issuing at most one grouped query per
//! (statistic × kind) plus one like-membership query per kind when a
//! requesting user is known, never one query per item. That bound is the
//! load-bearing invariant of this module; a reimplementation that walks
//! items individually is wrong even if it returns the same numbers.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use futures::future::{self, BoxFuture};
use metrics::histogram;
use tracing::debug;
use uuid::Uuid;

use plaza_api_types::StatsRecord;

use crate::application::repos::{RepoError, StatsRepo};
use crate::domain::content::{ContentKind, ContentRef, KindSpec, Statistic};

enum Grouped {
    Counts {
        statistic: Statistic,
        counts: HashMap<Uuid, u64>,
    },
    Membership {
        members: HashSet<Uuid>,
    },
}

#[derive(Clone)]
pub struct StatsService {
    repo: Arc<dyn StatsRepo>,
}

impl StatsService {
    pub fn new(repo: Arc<dyn StatsRepo>) -> Self {
        Self { repo }
    }

    /// Aggregate statistics for a heterogeneous batch.
    ///
    /// Every requested id appears in the result, pre-seeded with a zero
    /// record; ids absent from the store are indistinguishable from ids
    /// with no activity here; existence is the caller's concern. Any
    /// failed sub-query fails the whole call; no partially-merged map is
    /// ever returned.
    pub async fn batch(
        &self,
        refs: &[ContentRef],
        requester: Option<Uuid>,
    ) -> Result<HashMap<Uuid, StatsRecord>, RepoError> {
        if refs.is_empty() {
            return Ok(HashMap::new());
        }

        let started_at = Instant::now();
        let by_kind = partition_by_kind(refs);

        let mut queries: Vec<BoxFuture<'_, Result<Grouped, RepoError>>> = Vec::new();
        for (kind, ids) in &by_kind {
            let spec = KindSpec::of(*kind);
            for statistic in spec.statistics() {
                queries.push(Box::pin(async move {
                    let counts = self.repo.count_grouped(*kind, *statistic, ids).await?;
                    Ok(Grouped::Counts {
                        statistic: *statistic,
                        counts,
                    })
                }));
            }
            if let Some(user_id) = requester {
                queries.push(Box::pin(async move {
                    let members = self.repo.liked_by_user(*kind, user_id, ids).await?;
                    Ok(Grouped::Membership { members })
                }));
            }
        }

        let query_count = queries.len();
        let grouped = future::try_join_all(queries).await?;

        let mut merged: HashMap<Uuid, StatsRecord> = refs
            .iter()
            .map(|item| (item.id, StatsRecord::default()))
            .collect();

        for result in grouped {
            match result {
                Grouped::Counts { statistic, counts } => {
                    for (id, count) in counts {
                        if let Some(record) = merged.get_mut(&id) {
                            match statistic {
                                Statistic::Likes => record.like_count = count,
                                Statistic::Comments => record.comment_count = count,
                                Statistic::Views => record.view_count = count,
                            }
                        }
                    }
                }
                Grouped::Membership { members } => {
                    for id in members {
                        if let Some(record) = merged.get_mut(&id) {
                            record.is_liked = true;
                        }
                    }
                }
            }
        }

        histogram!("plaza_stats_batch_ms")
            .record(started_at.elapsed().as_secs_f64() * 1000.0);
        debug!(
            target = "plaza::stats",
            items = refs.len(),
            kinds = by_kind.len(),
            queries = query_count,
            "batch aggregation complete"
        );

        Ok(merged)
    }
}

/// Group requested ids by kind, deduplicating within each group so a ref
/// repeated in the input costs nothing extra downstream.
fn partition_by_kind(refs: &[ContentRef]) -> HashMap<ContentKind, Vec<Uuid>> {
    let mut by_kind: HashMap<ContentKind, Vec<Uuid>> = HashMap::new();
    let mut seen: HashSet<(ContentKind, Uuid)> = HashSet::with_capacity(refs.len());
    for item in refs {
        if seen.insert((item.kind, item.id)) {
            by_kind.entry(item.kind).or_default().push(item.id);
        }
    }
    by_kind
}
