use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{CatalogError, CatalogSource, ListedFile, ListingPage, PAGE_SIZE};

/// Google Drive v3 listing backend, authenticated with an API key.
pub struct DriveSource {
    api_key: String,
    base_url: String,
    client: Client,
    folder_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    #[serde(default)]
    files: Vec<ListedFile>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl DriveSource {
    pub fn new(base_url: &str, folder_id: &str, api_key: &str) -> Result<Self, anyhow::Error> {
        let client = Client::builder().build()?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            folder_id: folder_id.to_string(),
        })
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.base_url)
    }

    fn query(&self) -> String {
        format!(
            "'{}' in parents and (mimeType contains 'image/')",
            self.folder_id
        )
    }
}

#[async_trait]
impl CatalogSource for DriveSource {
    async fn list_page(&self, page_token: Option<&str>) -> Result<ListingPage, CatalogError> {
        let page_size = PAGE_SIZE.to_string();
        let query = self.query();
        let mut params = vec![
            ("q", query.as_str()),
            ("key", self.api_key.as_str()),
            ("fields", "files(id,name),nextPageToken"),
            ("pageSize", page_size.as_str()),
            ("orderBy", "name"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let resp = self
            .client
            .get(self.files_url())
            .query(&params)
            .send()
            .await
            .map_err(|e| CatalogError::Upstream(format!("Google Drive API Error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = resp
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            tracing::warn!(%status, error = %message, "Drive listing request failed");
            return Err(CatalogError::Upstream(format!(
                "Google Drive API Error: {message}"
            )));
        }

        let body: FileListResponse = resp
            .json()
            .await
            .map_err(|e| CatalogError::Upstream(format!("Google Drive API Error: {e}")))?;

        Ok(ListingPage {
            files: body.files,
            next_page_token: body.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    fn thumbnail_url(&self, id: &str) -> String {
        format!("https://drive.google.com/thumbnail?id={id}&sz=w1200")
    }
}
