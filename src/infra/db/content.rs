//! Recent-content queries for the feed assembler.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{ContentRepo, RecentContentRow, RepoError};
use crate::domain::content::{ContentKind, KindSpec};

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl ContentRepo for PostgresRepositories {
    async fn recent(
        &self,
        kind: ContentKind,
        limit: u32,
    ) -> Result<Vec<RecentContentRow>, RepoError> {
        let spec = KindSpec::of(kind);
        let sql = format!(
            "SELECT id, title, created_at FROM {table} \
             WHERE deleted_at IS NULL \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1",
            table = spec.content_table,
        );

        let limit = i64::from(limit.clamp(1, 100));
        let rows: Vec<(Uuid, String, OffsetDateTime)> = sqlx::query_as(&sql)
            .bind(limit)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, title, created_at)| RecentContentRow {
                id,
                title,
                created_at,
            })
            .collect())
    }
}
