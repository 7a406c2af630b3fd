use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::{Path, PathBuf};

use super::{CatalogError, CatalogSource, ListedFile, ListingPage, PAGE_SIZE};

/// Everything except RFC 3986 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Local directory catalog for development and testing.
/// File names double as ids; continuation tokens are offsets into the sorted listing.
pub struct LocalSource {
    base_path: PathBuf,
    page_size: usize,
}

impl LocalSource {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            page_size: PAGE_SIZE,
        })
    }

    /// Override the page size (useful for exercising pagination).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Resolve a photo name to a path inside the base directory.
    /// Returns `None` for names that would escape it.
    pub fn photo_path(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.starts_with('.') {
            return None;
        }
        Some(self.base_path.join(name))
    }

    async fn image_names(&self) -> Result<Vec<String>, std::io::Error> {
        let mut names = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.base_path).await?;
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let is_image = mime_guess::from_path(&name)
                .first()
                .is_some_and(|m| m.type_() == mime_guess::mime::IMAGE);
            if is_image {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl CatalogSource for LocalSource {
    async fn list_page(&self, page_token: Option<&str>) -> Result<ListingPage, CatalogError> {
        let offset = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| CatalogError::Upstream(format!("Invalid page token: {token}")))?,
            None => 0,
        };

        let names = self.image_names().await?;
        let end = (offset + self.page_size).min(names.len());
        let files = names
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|name| ListedFile {
                id: name.clone(),
                name: name.clone(),
            })
            .collect();

        Ok(ListingPage {
            files,
            next_page_token: (end < names.len()).then(|| end.to_string()),
        })
    }

    fn thumbnail_url(&self, id: &str) -> String {
        format!("/photos/{}", utf8_percent_encode(id, PATH_SEGMENT))
    }
}
