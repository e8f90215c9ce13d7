//! HTTP-backed stats fetcher.
//!
//! Fetches through the batch endpoint even for single items so the
//! server side always takes the grouped-query path.

use async_trait::async_trait;
use uuid::Uuid;

use plaza_api_types::{BatchStatsRequest, BatchStatsResponse, ContentRef, StatsRecord};

use crate::domain::content::ContentKind;

use super::{FetchError, StatsFetcher};

pub struct HttpStatsFetcher {
    client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl HttpStatsFetcher {
    pub fn new(base_url: impl Into<String>, bearer: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer,
        }
    }
}

#[async_trait]
impl StatsFetcher for HttpStatsFetcher {
    async fn fetch_stats(&self, kind: ContentKind, id: Uuid) -> Result<StatsRecord, FetchError> {
        let request = BatchStatsRequest {
            items: vec![ContentRef::new(id, kind)],
        };

        let mut builder = self
            .client
            .post(format!("{}/api/stats/batch", self.base_url))
            .json(&request);
        if let Some(token) = self.bearer.as_deref() {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body: BatchStatsResponse = response
            .json()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))?;

        body.items
            .into_iter()
            .find(|entry| entry.id == id && entry.kind == kind)
            .map(|entry| entry.stats)
            .ok_or(FetchError::MissingItem)
    }
}
