//! Grouped interaction-count queries.
//!
//! One round trip per (statistic × kind): ids arrive as a single array
//! bind and come back grouped by target id. Table and column names are
//! compile-time constants from [`KindSpec`], never derived from input.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{RepoError, StatsRepo};
use crate::domain::content::{ContentKind, KindSpec, Statistic};

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl StatsRepo for PostgresRepositories {
    async fn count_grouped(
        &self,
        kind: ContentKind,
        statistic: Statistic,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let spec = KindSpec::of(kind);
        if statistic == Statistic::Comments && !spec.supports_comments {
            return Err(RepoError::invalid_input(format!(
                "kind `{kind}` has no comment statistic"
            )));
        }

        // comments soft-delete; likes and view_records are append/delete-only
        let deleted_filter = match statistic {
            Statistic::Comments => " AND deleted_at IS NULL",
            Statistic::Likes | Statistic::Views => "",
        };
        let sql = format!(
            "SELECT {column}, COUNT(*) FROM {table} \
             WHERE {column} = ANY($1){deleted_filter} \
             GROUP BY {column}",
            column = spec.target_column,
            table = statistic.table(),
        );

        let rows: Vec<(Uuid, i64)> = sqlx::query_as(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(id, count)| Ok((id, Self::convert_count(count)?)))
            .collect()
    }

    async fn liked_by_user(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let spec = KindSpec::of(kind);
        let sql = format!(
            "SELECT {column} FROM likes WHERE user_id = $1 AND {column} = ANY($2)",
            column = spec.target_column,
        );

        let rows: Vec<(Uuid,)> = sqlx::query_as(&sql)
            .bind(user_id)
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
