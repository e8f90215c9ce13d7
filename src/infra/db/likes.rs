//! Like-row writes.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{LikesRepo, RepoError};
use crate::domain::content::{ContentKind, KindSpec};

use super::{PostgresRepositories, map_sqlx_error};

#[async_trait]
impl LikesRepo for PostgresRepositories {
    async fn toggle_like(
        &self,
        kind: ContentKind,
        target_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepoError> {
        let spec = KindSpec::of(kind);

        let delete_sql = format!(
            "DELETE FROM likes WHERE user_id = $1 AND {column} = $2",
            column = spec.target_column,
        );
        let deleted = sqlx::query(&delete_sql)
            .bind(user_id)
            .bind(target_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();

        if deleted > 0 {
            return Ok(false);
        }

        let insert_sql = format!(
            "INSERT INTO likes (id, user_id, {column}, created_at) VALUES ($1, $2, $3, $4)",
            column = spec.target_column,
        );
        sqlx::query(&insert_sql)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(target_id)
            .bind(OffsetDateTime::now_utc())
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(true)
    }

    async fn like_count(&self, kind: ContentKind, target_id: Uuid) -> Result<u64, RepoError> {
        let spec = KindSpec::of(kind);
        let sql = format!(
            "SELECT COUNT(*) FROM likes WHERE {column} = $1",
            column = spec.target_column,
        );

        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(target_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(count)
    }
}
