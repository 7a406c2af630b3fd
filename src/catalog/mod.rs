mod cache;
mod drive;
mod local;

pub use cache::{fetch_all_entries, CacheSnapshot, CatalogCache, CatalogView, STALE_WARNING};
pub use drive::DriveSource;
pub use local::LocalSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on entries requested per listing page.
pub const PAGE_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Upstream(String),
}

/// A file as reported by the listing backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListedFile {
    pub id: String,
    pub name: String,
}

/// One page of a listing, with the token for the next page if there is one.
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub files: Vec<ListedFile>,
    pub next_page_token: Option<String>,
}

/// A photo in the catalog. `url` is derived from `id` by the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoEntry {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// Abstraction over the external file listing the catalog is built from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch one page of image files, continuing from `page_token` when given.
    async fn list_page(&self, page_token: Option<&str>) -> Result<ListingPage, CatalogError>;

    /// Thumbnail URL for a file id.
    fn thumbnail_url(&self, id: &str) -> String;
}
