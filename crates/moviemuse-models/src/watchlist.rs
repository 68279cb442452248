use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user watchlist document as stored in the remote document store.
///
/// `updated_at` is assigned server-side; clients never write it directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistRecord {
    pub ids: Vec<u64>,
    pub updated_at: DateTime<Utc>,
}
