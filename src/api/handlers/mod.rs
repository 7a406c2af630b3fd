mod admin;
mod analytics;
mod catalog;
mod likes;
mod static_files;

use crate::api::response::ApiError;
use crate::catalog::CatalogCache;
use crate::ledger::LikeLedger;
use crate::AppState;

pub use admin::health;
pub use analytics::analytics;
pub use catalog::list_photos;
pub use likes::{like, like_status, unlike};
pub use static_files::serve_photo;

/// Fallback for methods a route does not support.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn require_catalog(state: &AppState) -> Result<&CatalogCache, ApiError> {
    state.catalog.as_ref().ok_or_else(|| {
        tracing::error!("Photo catalog requested but not configured");
        ApiError::Configuration
    })
}

fn require_ledger(state: &AppState) -> Result<&LikeLedger, ApiError> {
    state.ledger.as_ref().ok_or_else(|| {
        tracing::error!("Like ledger requested but not configured");
        ApiError::Configuration
    })
}
