//! Statistics and feed handlers.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use plaza_api_types::{
    BatchStatsEntry, BatchStatsRequest, BatchStatsResponse, FeedResponse, LikeToggleRequest,
    LikeToggleResponse, StatsRecord,
};

use super::HttpState;
use super::error::{ApiError, repo_error_to_api};
use super::middleware::MaybePrincipal;

const MAX_BATCH_ITEMS: usize = 200;
const DEFAULT_FEED_LIMIT: u32 = 20;

/// Batch statistics endpoint.
///
/// Auth is optional: anonymous requests get `isLiked: false` across the
/// board. Every requested item appears in the response, zero-valued when
/// it has no recorded activity.
pub async fn batch_stats(
    State(state): State<HttpState>,
    Extension(MaybePrincipal(principal)): Extension<MaybePrincipal>,
    Json(request): Json<BatchStatsRequest>,
) -> Result<Json<BatchStatsResponse>, ApiError> {
    if request.items.is_empty() {
        return Err(ApiError::bad_request("No items requested", None));
    }
    if request.items.len() > MAX_BATCH_ITEMS {
        return Err(ApiError::bad_request(
            "Too many items in one batch",
            Some(format!("limit is {MAX_BATCH_ITEMS}")),
        ));
    }

    let requester = principal.map(|p| p.user_id);
    let stats = state
        .stats
        .batch(&request.items, requester)
        .await
        .map_err(repo_error_to_api)?;

    let items = request
        .items
        .iter()
        .map(|item| BatchStatsEntry {
            id: item.id,
            kind: item.kind,
            stats: stats.get(&item.id).copied().unwrap_or(StatsRecord::default()),
        })
        .collect();

    Ok(Json(BatchStatsResponse { items }))
}

pub async fn toggle_like(
    State(state): State<HttpState>,
    Extension(MaybePrincipal(principal)): Extension<MaybePrincipal>,
    Json(request): Json<LikeToggleRequest>,
) -> Result<Json<LikeToggleResponse>, ApiError> {
    let principal = principal.ok_or_else(ApiError::unauthorized)?;

    let response = state
        .likes
        .toggle(request.kind, request.id, principal.user_id)
        .await
        .map_err(repo_error_to_api)?;

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<u32>,
}

pub async fn feed(
    State(state): State<HttpState>,
    Extension(MaybePrincipal(principal)): Extension<MaybePrincipal>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, 50);
    let requester = principal.map(|p| p.user_id);

    let items = state
        .feed
        .assemble(requester, limit)
        .await
        .map_err(repo_error_to_api)?;

    Ok(Json(FeedResponse { items }))
}
