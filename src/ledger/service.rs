use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;

use super::models::{
    InsertOutcome, LikeOutcome, LikeStatus, RankedPhoto, RecentLike, SummaryStats,
};
use super::{LedgerError, LikeStore};

/// Most recent likes considered by summary and ranking.
pub const SCAN_LIMIT: usize = 10_000;

pub const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Error)]
pub enum LikeError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Store(#[from] LedgerError),
}

/// Like/unlike bookkeeping and aggregate statistics over a [`LikeStore`].
#[derive(Clone)]
pub struct LikeLedger {
    store: Arc<dyn LikeStore>,
}

impl LikeLedger {
    pub fn new(store: Arc<dyn LikeStore>) -> Self {
        Self { store }
    }

    /// Record a like once per (photo, fingerprint).
    pub async fn like(
        &self,
        photo_id: &str,
        user_fingerprint: &str,
    ) -> Result<LikeOutcome, LikeError> {
        require_photo_id(photo_id)?;

        if self.store.exists(photo_id, user_fingerprint).await? {
            return Ok(LikeOutcome::AlreadyLiked);
        }

        match self.store.insert(photo_id, user_fingerprint).await {
            Ok(InsertOutcome::Inserted) => {}
            Ok(InsertOutcome::Duplicate) => {
                tracing::debug!(photo_id, "Concurrent like rejected by store");
                return Ok(LikeOutcome::AlreadyLiked);
            }
            Err(e) => {
                tracing::error!(photo_id, error = %e, "Failed to insert like");
                return Err(e.into());
            }
        }

        let count = self.store.count(Some(photo_id)).await?;
        tracing::debug!(photo_id, count, "Recorded like");
        Ok(LikeOutcome::Liked { count })
    }

    /// Remove the caller's like if present and return the new count.
    pub async fn unlike(&self, photo_id: &str, user_fingerprint: &str) -> Result<u64, LikeError> {
        require_photo_id(photo_id)?;

        let removed = self
            .store
            .delete(photo_id, user_fingerprint)
            .await
            .inspect_err(|e| tracing::error!(photo_id, error = %e, "Failed to delete like"))?;

        let count = self.store.count(Some(photo_id)).await?;
        tracing::debug!(photo_id, removed, count, "Removed like");
        Ok(count)
    }

    pub async fn like_status(
        &self,
        photo_id: &str,
        user_fingerprint: &str,
    ) -> Result<LikeStatus, LikeError> {
        require_photo_id(photo_id)?;

        let count = self.store.count(Some(photo_id)).await?;
        let liked = self.store.exists(photo_id, user_fingerprint).await?;
        Ok(LikeStatus { count, liked })
    }

    /// Totals over the ledger. Distinct counts only cover the most recent
    /// [`SCAN_LIMIT`] likes; the total is exact.
    pub async fn summary(&self) -> Result<SummaryStats, LikeError> {
        let total_likes = self.store.count(None).await?;
        let rows = self.store.recent(SCAN_LIMIT).await?;

        let photos: HashSet<&str> = rows.iter().map(|r| r.photo_id.as_str()).collect();
        let users: HashSet<&str> = rows.iter().map(|r| r.user_fingerprint.as_str()).collect();

        Ok(SummaryStats {
            total_likes,
            unique_photos: photos.len() as u64,
            unique_users: users.len() as u64,
            avg_likes_per_photo: average_likes(total_likes, photos.len()),
        })
    }

    /// Photos with the most likes among the most recent [`SCAN_LIMIT`] likes.
    pub async fn ranking(&self, limit: usize) -> Result<Vec<RankedPhoto>, LikeError> {
        let rows = self.store.recent(SCAN_LIMIT).await?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for row in rows {
            *counts.entry(row.photo_id).or_default() += 1;
        }

        let mut ranking: Vec<RankedPhoto> = counts
            .into_iter()
            .map(|(photo_id, count)| RankedPhoto { photo_id, count })
            .collect();
        ranking.sort_by(|a, b| b.count.cmp(&a.count));
        ranking.truncate(limit);
        Ok(ranking)
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<RecentLike>, LikeError> {
        let rows = self.store.recent(limit).await?;
        Ok(rows.into_iter().map(RecentLike::from).collect())
    }
}

fn require_photo_id(photo_id: &str) -> Result<(), LikeError> {
    if photo_id.is_empty() {
        return Err(LikeError::InvalidArgument("photoId is required".to_string()));
    }
    Ok(())
}

/// Likes per liked photo, rounded to two decimals; 0 when nothing is liked.
pub fn average_likes(total: u64, photos: usize) -> f64 {
    if photos == 0 {
        return 0.0;
    }
    (total as f64 / photos as f64 * 100.0).round() / 100.0
}
