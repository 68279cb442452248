use crate::remote::{RemoteStore, RemoteStoreError};
use async_trait::async_trait;
use moviemuse_models::WatchlistRecord;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tracing::debug;

/// Document-store client for per-user watchlist records.
///
/// Documents live at `{base_url}/watchlists/{user_id}`; the store assigns
/// `updated_at` server-side. No version check is sent with updates: writes
/// from concurrent clients resolve last-write-wins.
pub struct RestRemoteStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RestRemoteStore {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn record_url(&self, user_id: &str) -> String {
        format!("{}/watchlists/{}", self.base_url, urlencoding::encode(user_id))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn error_from(response: reqwest::Response) -> RemoteStoreError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        RemoteStoreError::Api { status, message }
    }
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn fetch(&self, user_id: &str) -> Result<Option<WatchlistRecord>, RemoteStoreError> {
        let url = self.record_url(user_id);
        debug!(%url, "Fetching remote watchlist record");

        let response = self
            .authorize(self.client.get(&url))
            .header("Accept", "application/json")
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        Ok(Some(response.json().await?))
    }

    async fn create(&self, user_id: &str, ids: &[u64]) -> Result<(), RemoteStoreError> {
        let url = self.record_url(user_id);
        debug!(%url, count = ids.len(), "Creating remote watchlist record");

        let response = self
            .authorize(self.client.put(&url))
            .json(&json!({ "ids": ids }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    async fn update(&self, user_id: &str, ids: &[u64]) -> Result<(), RemoteStoreError> {
        let url = self.record_url(user_id);
        debug!(%url, count = ids.len(), "Updating remote watchlist record");

        let response = self
            .authorize(self.client.patch(&url))
            .json(&json!({ "ids": ids }))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RemoteStoreError::NotFound);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }
}
