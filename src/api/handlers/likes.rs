use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::require_ledger;
use crate::api::response::{ApiError, AppJson, AppQuery, Success};
use crate::fingerprint::ClientFingerprint;
use crate::ledger::models::LikeOutcome;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PhotoParams {
    #[serde(default, rename = "photoId")]
    pub photo_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    #[serde(default, rename = "photoId")]
    pub photo_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikeStatusResponse {
    pub count: u64,
    pub liked: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LikeResponse {
    Changed {
        liked: bool,
        count: u64,
    },
    AlreadyLiked {
        message: &'static str,
        #[serde(rename = "alreadyLiked")]
        already_liked: bool,
    },
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn like_status(
    State(state): State<Arc<AppState>>,
    ClientFingerprint(user): ClientFingerprint,
    AppQuery(params): AppQuery<PhotoParams>,
) -> Result<Json<Success<LikeStatusResponse>>, ApiError> {
    let ledger = require_ledger(&state)?;
    let photo_id = params.photo_id.unwrap_or_default();

    let status = ledger.like_status(&photo_id, &user).await?;

    Ok(Success::json(LikeStatusResponse {
        count: status.count,
        liked: status.liked,
    }))
}

pub async fn like(
    State(state): State<Arc<AppState>>,
    ClientFingerprint(user): ClientFingerprint,
    AppJson(req): AppJson<LikeRequest>,
) -> Result<Json<Success<LikeResponse>>, ApiError> {
    let ledger = require_ledger(&state)?;
    let photo_id = req.photo_id.unwrap_or_default();

    let response = match ledger.like(&photo_id, &user).await? {
        LikeOutcome::Liked { count } => LikeResponse::Changed { liked: true, count },
        LikeOutcome::AlreadyLiked => LikeResponse::AlreadyLiked {
            message: "Already liked",
            already_liked: true,
        },
    };

    Ok(Success::json(response))
}

pub async fn unlike(
    State(state): State<Arc<AppState>>,
    ClientFingerprint(user): ClientFingerprint,
    AppQuery(params): AppQuery<PhotoParams>,
) -> Result<Json<Success<LikeResponse>>, ApiError> {
    let ledger = require_ledger(&state)?;
    let photo_id = params.photo_id.unwrap_or_default();

    let count = ledger.unlike(&photo_id, &user).await?;

    Ok(Success::json(LikeResponse::Changed {
        liked: false,
        count,
    }))
}
