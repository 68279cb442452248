pub mod browse;
pub mod client;
pub mod error;
pub mod format;
pub mod images;

pub use browse::{BrowseQuery, Category, SortBy, MAX_PAGE};
pub use client::CatalogClient;
pub use error::CatalogError;
pub use format::{format_rating, format_runtime};
pub use images::{image_url, ImageSize};
