//! Auth-session rows backing opaque bearer tokens.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::repos::{NewSessionParams, RepoError, SessionRow, SessionsRepo};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    prefix: String,
    hashed_secret: Vec<u8>,
    user_id: Uuid,
    expires_at: OffsetDateTime,
}

impl From<AuthSessionRow> for SessionRow {
    fn from(row: AuthSessionRow) -> Self {
        Self {
            prefix: row.prefix,
            hashed_secret: row.hashed_secret,
            user_id: row.user_id,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl SessionsRepo for PostgresRepositories {
    async fn create_session(&self, params: NewSessionParams) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO auth_sessions (prefix, hashed_secret, user_id, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&params.prefix)
        .bind(&params.hashed_secret)
        .bind(params.user_id)
        .bind(params.expires_at)
        .bind(OffsetDateTime::now_utc())
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<SessionRow>, RepoError> {
        let row: Option<AuthSessionRow> = sqlx::query_as(
            "SELECT prefix, hashed_secret, user_id, expires_at \
             FROM auth_sessions WHERE prefix = $1",
        )
        .bind(prefix)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(SessionRow::from))
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM auth_sessions WHERE prefix = $1")
            .bind(prefix)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
