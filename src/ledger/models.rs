use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One like: a (photo, fingerprint) pair with the time the store recorded it.
///
/// `created_at` is kept exactly as the store reports it. Supabase columns may
/// be `timestamptz` or a zone-less `timestamp`, so it is never parsed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikeRecord {
    pub photo_id: String,
    pub user_fingerprint: String,
    pub created_at: String,
}

/// Result of a store insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The store already held a like for the pair (uniqueness enforced by the store).
    Duplicate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked { count: u64 },
    AlreadyLiked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeStatus {
    pub count: u64,
    pub liked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_likes: u64,
    pub unique_photos: u64,
    pub unique_users: u64,
    pub avg_likes_per_photo: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPhoto {
    pub photo_id: String,
    pub count: u64,
}

/// A recent like as exposed by analytics (no fingerprint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentLike {
    pub photo_id: String,
    pub created_at: String,
}

impl From<LikeRecord> for RecentLike {
    fn from(record: LikeRecord) -> Self {
        Self {
            photo_id: record.photo_id,
            created_at: record.created_at,
        }
    }
}

/// Local ledger row as persisted in redb.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredLike {
    pub created_at: DateTime<Utc>,
    /// Store-assigned insertion order; breaks ties between equal timestamps.
    pub sequence: u64,
}
