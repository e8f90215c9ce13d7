//! Shared request and response types for the plaza HTTP API.
//!
//! Used by the server handlers and by client-tier consumers (the client
//! stats cache fetches through these types), so the wire contract lives in
//! one place.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminator for the four content surfaces that carry interaction
/// statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "content_kind", rename_all = "snake_case")
)]
pub enum ContentKind {
    Confession,
    Post,
    MarketItem,
    Task,
}

impl ContentKind {
    /// Returns the slug used for serialization and DB storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confession => "confession",
            Self::Post => "post",
            Self::MarketItem => "market_item",
            Self::Task => "task",
        }
    }

    /// Returns all kind variants for iteration.
    pub fn all() -> &'static [ContentKind] {
        &[Self::Confession, Self::Post, Self::MarketItem, Self::Task]
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confession" => Ok(Self::Confession),
            "post" => Ok(Self::Post),
            "market_item" => Ok(Self::MarketItem),
            "task" => Ok(Self::Task),
            _ => Err(()),
        }
    }
}

/// Identity of one piece of content for aggregation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef {
    pub id: Uuid,
    pub kind: ContentKind,
}

impl ContentRef {
    pub fn new(id: Uuid, kind: ContentKind) -> Self {
        Self { id, kind }
    }
}

/// Aggregated interaction counters for one piece of content.
///
/// A record is always complete: ids with no recorded activity serialize as
/// all-zero records, never as absent entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    pub like_count: u64,
    pub comment_count: u64,
    pub view_count: u64,
    pub is_liked: bool,
}

/// Request body for `POST /api/stats/batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatsRequest {
    pub items: Vec<ContentRef>,
}

/// One entry of the batch statistics response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatsEntry {
    pub id: Uuid,
    pub kind: ContentKind,
    #[serde(flatten)]
    pub stats: StatsRecord,
}

/// Response body for `POST /api/stats/batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatsResponse {
    pub items: Vec<BatchStatsEntry>,
}

/// Request body for `POST /api/likes/toggle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeToggleRequest {
    pub id: Uuid,
    pub kind: ContentKind,
}

/// Response body for `POST /api/likes/toggle`.
///
/// Callers are expected to feed this into their local stats cache as an
/// optimistic mutation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggleResponse {
    pub liked: bool,
    pub new_count: u64,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

/// Response body for `GET /api/auth/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

/// One feed entry: a content ref plus its aggregated statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: Uuid,
    pub kind: ContentKind,
    pub title: String,
    #[serde(flatten)]
    pub stats: StatsRecord,
}

/// Response body for `GET /api/feed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedResponse {
    pub items: Vec<FeedEntry>,
}
