//! Feed assembly.
//!
//! Pulls the most recent rows of every content kind concurrently, then
//! attaches statistics through a single aggregator batch. The feed is
//! the highest-volume consumer of [`StatsService`] and must never fall
//! back to per-item stat lookups.

use std::sync::Arc;

use futures::future::{self, BoxFuture};
use uuid::Uuid;

use plaza_api_types::{ContentKind, FeedEntry, StatsRecord};

use crate::application::repos::{ContentRepo, RecentContentRow, RepoError};
use crate::application::stats::StatsService;
use crate::domain::content::ContentRef;

#[derive(Clone)]
pub struct FeedService {
    content: Arc<dyn ContentRepo>,
    stats: StatsService,
}

impl FeedService {
    pub fn new(content: Arc<dyn ContentRepo>, stats: StatsService) -> Self {
        Self { content, stats }
    }

    /// Most recent items across all kinds, newest first, with statistics.
    pub async fn assemble(
        &self,
        requester: Option<Uuid>,
        limit_per_kind: u32,
    ) -> Result<Vec<FeedEntry>, RepoError> {
        let queries: Vec<BoxFuture<'_, Result<(ContentKind, Vec<RecentContentRow>), RepoError>>> =
            ContentKind::all()
                .iter()
                .map(|kind| {
                    let fut: BoxFuture<'_, _> = Box::pin(async move {
                        let rows = self.content.recent(*kind, limit_per_kind).await?;
                        Ok((*kind, rows))
                    });
                    fut
                })
                .collect();
        let per_kind = future::try_join_all(queries).await?;

        let mut items: Vec<(ContentKind, RecentContentRow)> = Vec::new();
        for (kind, rows) in per_kind {
            items.extend(rows.into_iter().map(|row| (kind, row)));
        }
        items.sort_by(|a, b| b.1.created_at.cmp(&a.1.created_at));

        let refs: Vec<ContentRef> = items
            .iter()
            .map(|(kind, row)| ContentRef::new(row.id, *kind))
            .collect();
        let stats = self.stats.batch(&refs, requester).await?;

        Ok(items
            .into_iter()
            .map(|(kind, row)| FeedEntry {
                id: row.id,
                kind,
                title: row.title,
                stats: stats.get(&row.id).copied().unwrap_or(StatsRecord::default()),
            })
            .collect())
    }
}
