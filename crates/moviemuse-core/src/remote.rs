use async_trait::async_trait;
use moviemuse_models::WatchlistRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteStoreError {
    /// The per-user record does not exist. Kept distinct from other failures
    /// so callers can fall back to creating the record.
    #[error("watchlist record not found")]
    NotFound,

    #[error("remote store request failed: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("remote store request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RemoteStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteStoreError::NotFound)
    }
}

/// Per-user watchlist document store, consumed not owned.
///
/// One record per user identity; `updated_at` is assigned by the store on
/// every create/update.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Returns the stored record, or None when the user has no record yet
    async fn fetch(&self, user_id: &str) -> Result<Option<WatchlistRecord>, RemoteStoreError>;

    async fn create(&self, user_id: &str, ids: &[u64]) -> Result<(), RemoteStoreError>;

    /// Replaces the ids of an existing record. Fails with
    /// [`RemoteStoreError::NotFound`] when the record does not exist.
    async fn update(&self, user_id: &str, ids: &[u64]) -> Result<(), RemoteStoreError>;
}
