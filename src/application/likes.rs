//! Like toggling.
//!
//! The write side of the statistics pipeline: flip the requester's like
//! row and report the authoritative new count, which callers feed back
//! into their local stats cache as an optimistic mutation.

use std::sync::Arc;

use uuid::Uuid;

use plaza_api_types::LikeToggleResponse;

use crate::application::repos::{LikesRepo, RepoError};
use crate::domain::content::ContentKind;

#[derive(Clone)]
pub struct LikeService {
    repo: Arc<dyn LikesRepo>,
}

impl LikeService {
    pub fn new(repo: Arc<dyn LikesRepo>) -> Self {
        Self { repo }
    }

    pub async fn toggle(
        &self,
        kind: ContentKind,
        target_id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeToggleResponse, RepoError> {
        let liked = self.repo.toggle_like(kind, target_id, user_id).await?;
        let new_count = self.repo.like_count(kind, target_id).await?;
        Ok(LikeToggleResponse { liked, new_count })
    }
}
