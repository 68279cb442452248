use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// Non-2xx response from the catalog API, with its status_message when
    /// the error body could be decoded
    #[error("catalog request failed: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
