//! User rows for login and principal hydration.

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::repos::{RepoError, UserRow, UsersRepo};
use crate::domain::principal::Role;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct DbUserRow {
    id: Uuid,
    username: String,
    hashed_password: Vec<u8>,
    role: Role,
}

impl From<DbUserRow> for UserRow {
    fn from(row: DbUserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            hashed_password: row.hashed_password,
            role: row.role,
        }
    }
}

#[async_trait]
impl UsersRepo for PostgresRepositories {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, RepoError> {
        let row: Option<DbUserRow> = sqlx::query_as(
            "SELECT id, username, hashed_password, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRow::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRow>, RepoError> {
        let row: Option<DbUserRow> = sqlx::query_as(
            "SELECT id, username, hashed_password, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRow::from))
    }
}
