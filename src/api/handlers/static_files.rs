use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::AppState;

/// Serve a photo from the local catalog directory.
/// Route: GET /photos/*name
pub async fn serve_photo(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let path = state
        .local_photos
        .as_ref()
        .and_then(|source| source.photo_path(&name))
        .ok_or_else(|| ApiError::not_found("Photo not found"))?;

    let data = match tokio::fs::read(&path).await {
        Ok(data) => Bytes::from(data),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("Photo not found"));
        }
        Err(e) => return Err(ApiError::internal(format!("Failed to read photo: {e}"))),
    };

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    let mime_type = mime_guess::from_path(&name).first_or_octet_stream();
    headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .as_ref()
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    // Photos are immutable once placed in the directory
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}
