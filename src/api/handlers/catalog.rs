use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::require_catalog;
use crate::api::response::{ApiError, Success};
use crate::catalog::PhotoEntry;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub cached: bool,
    /// Whole seconds since the snapshot was fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_age: Option<i64>,
    pub total: usize,
    pub files: Vec<PhotoEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

// ============================================================================
// Handlers
// ============================================================================

/// The full catalog. Sampling is left to the client so one snapshot serves every request.
pub async fn list_photos(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Success<CatalogResponse>>, ApiError> {
    let view = require_catalog(&state)?.get_catalog().await?;

    Ok(Success::json(CatalogResponse {
        cached: view.cached,
        cache_age: view.cache_age.map(|age| age.num_seconds()),
        total: view.entries().len(),
        files: view.entries().to_vec(),
        warning: view.warning,
    }))
}
