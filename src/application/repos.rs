//! Repository traits describing persistence adapters.
//!
//! The aggregation and auth layers see the store only through these
//! traits; grouped-count reads are assumed atomic and consistent at call
//! time, and no transaction management happens above this boundary.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use thiserror::Error;

use crate::domain::content::{ContentKind, Statistic};
use crate::domain::principal::Role;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Grouped interaction-count reads, one call per (statistic × kind).
#[async_trait]
pub trait StatsRepo: Send + Sync {
    /// `SELECT target, COUNT(*) ... WHERE target = ANY(ids) GROUP BY target`
    /// over the statistic's interaction table for one content kind.
    async fn count_grouped(
        &self,
        kind: ContentKind,
        statistic: Statistic,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, u64>, RepoError>;

    /// Which of `ids` the user has a like row for, for one content kind.
    async fn liked_by_user(
        &self,
        kind: ContentKind,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<HashSet<Uuid>, RepoError>;
}

/// Like-row writes for the toggle endpoint.
#[async_trait]
pub trait LikesRepo: Send + Sync {
    /// Insert a like row if absent, delete it if present; returns the new
    /// liked state.
    async fn toggle_like(
        &self,
        kind: ContentKind,
        target_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepoError>;

    /// Current like count for one item.
    async fn like_count(&self, kind: ContentKind, target_id: Uuid) -> Result<u64, RepoError>;
}

/// Most-recent content refs per kind for the feed assembler.
#[derive(Debug, Clone)]
pub struct RecentContentRow {
    pub id: Uuid,
    pub title: String,
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn recent(
        &self,
        kind: ContentKind,
        limit: u32,
    ) -> Result<Vec<RecentContentRow>, RepoError>;
}

/// Stored auth-session row backing bearer-token verification.
#[derive(Debug, Clone)]
pub struct SessionRow {
    pub prefix: String,
    pub hashed_secret: Vec<u8>,
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewSessionParams {
    pub prefix: String,
    pub hashed_secret: Vec<u8>,
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
}

#[async_trait]
pub trait SessionsRepo: Send + Sync {
    async fn create_session(&self, params: NewSessionParams) -> Result<(), RepoError>;
    async fn find_by_prefix(&self, prefix: &str) -> Result<Option<SessionRow>, RepoError>;
    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), RepoError>;
}

/// User row shape needed for login and principal hydration.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub hashed_password: Vec<u8>,
    pub role: Role,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRow>, RepoError>;
}
