use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use photo_likes::ledger::models::{InsertOutcome, LikeOutcome, LikeRecord};
use photo_likes::ledger::{LedgerError, LikeError, LikeLedger, LikeStore, LocalLedgerStore};

fn test_ledger() -> (tempfile::TempDir, LocalLedgerStore, LikeLedger) {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalLedgerStore::open(dir.path().join("data")).unwrap();
    let ledger = LikeLedger::new(Arc::new(store.clone()));
    (dir, store, ledger)
}

/// In-memory store without a uniqueness constraint, for seeding arbitrary rows.
/// Rows are kept in insertion order, oldest first.
#[derive(Default)]
struct MemoryStore {
    rows: Mutex<Vec<LikeRecord>>,
    /// Report every pair as absent, as a concurrent request would observe.
    blind_lookups: bool,
    /// Reject inserts as a unique index would.
    unique_index: bool,
}

impl MemoryStore {
    fn seeded(counts: &[(&str, usize)]) -> Self {
        let store = MemoryStore::default();
        let start = Utc::now();
        let mut rows = store.rows.lock().unwrap();
        let mut n = 0;
        for (photo, count) in counts {
            for i in 0..*count {
                n += 1;
                rows.push(LikeRecord {
                    photo_id: photo.to_string(),
                    user_fingerprint: format!("user_{i}"),
                    created_at: (start + Duration::seconds(n)).to_rfc3339(),
                });
            }
        }
        drop(rows);
        store
    }
}

#[async_trait]
impl LikeStore for MemoryStore {
    async fn exists(&self, photo_id: &str, user_fingerprint: &str) -> Result<bool, LedgerError> {
        if self.blind_lookups {
            return Ok(false);
        }
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .any(|r| r.photo_id == photo_id && r.user_fingerprint == user_fingerprint))
    }

    async fn insert(
        &self,
        photo_id: &str,
        user_fingerprint: &str,
    ) -> Result<InsertOutcome, LedgerError> {
        let mut rows = self.rows.lock().unwrap();
        let present = rows
            .iter()
            .any(|r| r.photo_id == photo_id && r.user_fingerprint == user_fingerprint);
        if self.unique_index && present {
            return Ok(InsertOutcome::Duplicate);
        }
        rows.push(LikeRecord {
            photo_id: photo_id.to_string(),
            user_fingerprint: user_fingerprint.to_string(),
            created_at: Utc::now().to_rfc3339(),
        });
        Ok(InsertOutcome::Inserted)
    }

    async fn delete(&self, photo_id: &str, user_fingerprint: &str) -> Result<u64, LedgerError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.photo_id == photo_id && r.user_fingerprint == user_fingerprint));
        Ok((before - rows.len()) as u64)
    }

    async fn count(&self, photo_id: Option<&str>) -> Result<u64, LedgerError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| photo_id.map_or(true, |p| r.photo_id == p))
            .count() as u64)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<LikeRecord>, LedgerError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }
}

/// Store whose every call fails.
struct BrokenStore;

#[async_trait]
impl LikeStore for BrokenStore {
    async fn exists(&self, _: &str, _: &str) -> Result<bool, LedgerError> {
        Ok(false)
    }

    async fn insert(&self, _: &str, _: &str) -> Result<InsertOutcome, LedgerError> {
        Err(LedgerError::Backend(
            "new row violates row-level security policy".to_string(),
        ))
    }

    async fn delete(&self, _: &str, _: &str) -> Result<u64, LedgerError> {
        Err(LedgerError::Backend("connection refused".to_string()))
    }

    async fn count(&self, _: Option<&str>) -> Result<u64, LedgerError> {
        Err(LedgerError::Backend("connection refused".to_string()))
    }

    async fn recent(&self, _: usize) -> Result<Vec<LikeRecord>, LedgerError> {
        Err(LedgerError::Backend("connection refused".to_string()))
    }
}

// ============================================================================
// like / unlike / status
// ============================================================================

#[tokio::test]
async fn test_like_is_idempotent() {
    let (_dir, store, ledger) = test_ledger();

    let first = ledger.like("photo-1", "user_1").await.unwrap();
    assert_eq!(first, LikeOutcome::Liked { count: 1 });

    let second = ledger.like("photo-1", "user_1").await.unwrap();
    assert_eq!(second, LikeOutcome::AlreadyLiked);

    assert_eq!(store.count(Some("photo-1")).await.unwrap(), 1);
}

#[tokio::test]
async fn test_like_counts_per_photo() {
    let (_dir, _store, ledger) = test_ledger();

    ledger.like("photo-1", "user_1").await.unwrap();
    ledger.like("photo-2", "user_1").await.unwrap();
    let outcome = ledger.like("photo-1", "user_2").await.unwrap();

    assert_eq!(outcome, LikeOutcome::Liked { count: 2 });
}

#[tokio::test]
async fn test_unlike_without_like_succeeds() {
    let (_dir, _store, ledger) = test_ledger();

    assert_eq!(ledger.unlike("photo-1", "user_1").await.unwrap(), 0);

    ledger.like("photo-1", "user_2").await.unwrap();
    assert_eq!(ledger.unlike("photo-1", "user_1").await.unwrap(), 1);
}

#[tokio::test]
async fn test_unlike_removes_only_own_like() {
    let (_dir, _store, ledger) = test_ledger();
    ledger.like("photo-1", "user_1").await.unwrap();
    ledger.like("photo-1", "user_2").await.unwrap();

    assert_eq!(ledger.unlike("photo-1", "user_1").await.unwrap(), 1);

    let status = ledger.like_status("photo-1", "user_1").await.unwrap();
    assert_eq!(status.count, 1);
    assert!(!status.liked);
    let status = ledger.like_status("photo-1", "user_2").await.unwrap();
    assert!(status.liked);

    // A removed like can be given again
    let outcome = ledger.like("photo-1", "user_1").await.unwrap();
    assert_eq!(outcome, LikeOutcome::Liked { count: 2 });
}

#[tokio::test]
async fn test_like_status_of_unknown_photo() {
    let (_dir, _store, ledger) = test_ledger();

    let status = ledger.like_status("nobody-liked-this", "user_1").await.unwrap();
    assert_eq!(status.count, 0);
    assert!(!status.liked);
}

#[tokio::test]
async fn test_photo_id_is_required() {
    let (_dir, _store, ledger) = test_ledger();

    assert!(matches!(
        ledger.like("", "user_1").await,
        Err(LikeError::InvalidArgument(_))
    ));
    assert!(matches!(
        ledger.unlike("", "user_1").await,
        Err(LikeError::InvalidArgument(_))
    ));
    assert!(matches!(
        ledger.like_status("", "user_1").await,
        Err(LikeError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_whitespace_photo_id_is_an_ordinary_id() {
    let (_dir, _store, ledger) = test_ledger();

    let outcome = ledger.like(" ", "user_1").await.unwrap();
    assert_eq!(outcome, LikeOutcome::Liked { count: 1 });

    let status = ledger.like_status(" ", "user_1").await.unwrap();
    assert!(status.liked);
    assert_eq!(ledger.unlike(" ", "user_1").await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_duplicate_reports_already_liked() {
    let store = Arc::new(MemoryStore {
        blind_lookups: true,
        unique_index: true,
        ..Default::default()
    });
    let ledger = LikeLedger::new(store.clone());

    ledger.like("photo-1", "user_1").await.unwrap();
    let outcome = ledger.like("photo-1", "user_1").await.unwrap();

    assert_eq!(outcome, LikeOutcome::AlreadyLiked);
    assert_eq!(store.count(Some("photo-1")).await.unwrap(), 1);
}

#[tokio::test]
async fn test_store_errors_are_surfaced() {
    let ledger = LikeLedger::new(Arc::new(BrokenStore));

    let err = ledger.like("photo-1", "user_1").await.unwrap_err();
    assert!(matches!(err, LikeError::Store(_)));
    assert_eq!(err.to_string(), "new row violates row-level security policy");

    assert!(matches!(
        ledger.unlike("photo-1", "user_1").await,
        Err(LikeError::Store(_))
    ));
    assert!(ledger.summary().await.is_err());
}

// ============================================================================
// statistics
// ============================================================================

#[tokio::test]
async fn test_ranking_keeps_highest_counts() {
    let store = MemoryStore::seeded(&[("A", 5), ("B", 5), ("C", 1)]);
    let ledger = LikeLedger::new(Arc::new(store));

    let ranking = ledger.ranking(2).await.unwrap();

    assert_eq!(ranking.len(), 2);
    let mut ids: Vec<&str> = ranking.iter().map(|r| r.photo_id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["A", "B"]);
    assert!(ranking.iter().all(|r| r.count == 5));
}

#[tokio::test]
async fn test_ranking_sorted_descending() {
    let store = MemoryStore::seeded(&[("A", 1), ("B", 4), ("C", 2)]);
    let ledger = LikeLedger::new(Arc::new(store));

    let ranking = ledger.ranking(10).await.unwrap();

    let counts: Vec<(&str, u64)> = ranking
        .iter()
        .map(|r| (r.photo_id.as_str(), r.count))
        .collect();
    assert_eq!(counts, vec![("B", 4), ("C", 2), ("A", 1)]);
}

#[tokio::test]
async fn test_summary_average() {
    let store = MemoryStore::seeded(&[("A", 2), ("B", 3), ("C", 5)]);
    let ledger = LikeLedger::new(Arc::new(store));

    let summary = ledger.summary().await.unwrap();

    assert_eq!(summary.total_likes, 10);
    assert_eq!(summary.unique_photos, 3);
    assert_eq!(summary.unique_users, 5);
    assert_eq!(summary.avg_likes_per_photo, 3.33);
}

#[tokio::test]
async fn test_summary_of_empty_ledger() {
    let (_dir, _store, ledger) = test_ledger();

    let summary = ledger.summary().await.unwrap();

    assert_eq!(summary.total_likes, 0);
    assert_eq!(summary.unique_photos, 0);
    assert_eq!(summary.unique_users, 0);
    assert_eq!(summary.avg_likes_per_photo, 0.0);
}

#[tokio::test]
async fn test_recent_likes_newest_first() {
    let (_dir, _store, ledger) = test_ledger();
    ledger.like("first", "user_1").await.unwrap();
    ledger.like("second", "user_1").await.unwrap();
    ledger.like("third", "user_2").await.unwrap();

    let recent = ledger.recent(2).await.unwrap();

    let ids: Vec<&str> = recent.iter().map(|r| r.photo_id.as_str()).collect();
    assert_eq!(ids, vec!["third", "second"]);
    assert!(chrono::DateTime::parse_from_rfc3339(&recent[0].created_at).is_ok());
}

// ============================================================================
// local store
// ============================================================================

#[tokio::test]
async fn test_local_store_rejects_duplicate_pair() {
    let (_dir, store, _ledger) = test_ledger();

    assert_eq!(
        store.insert("photo-1", "user_1").await.unwrap(),
        InsertOutcome::Inserted
    );
    assert_eq!(
        store.insert("photo-1", "user_1").await.unwrap(),
        InsertOutcome::Duplicate
    );
    assert_eq!(store.count(None).await.unwrap(), 1);
}

#[tokio::test]
async fn test_local_store_count_by_photo_prefix() {
    let (_dir, store, _ledger) = test_ledger();
    store.insert("photo", "user_1").await.unwrap();
    store.insert("photo-1", "user_1").await.unwrap();
    store.insert("photo-1", "user_2").await.unwrap();
    store.insert("photo-2", "user_1").await.unwrap();

    assert_eq!(store.count(Some("photo")).await.unwrap(), 1);
    assert_eq!(store.count(Some("photo-1")).await.unwrap(), 2);
    assert_eq!(store.count(Some("photo-3")).await.unwrap(), 0);
    assert_eq!(store.count(None).await.unwrap(), 4);
}

#[tokio::test]
async fn test_local_store_delete_counts_removed() {
    let (_dir, store, _ledger) = test_ledger();
    store.insert("photo-1", "user_1").await.unwrap();

    assert_eq!(store.delete("photo-1", "user_1").await.unwrap(), 1);
    assert_eq!(store.delete("photo-1", "user_1").await.unwrap(), 0);
    assert!(!store.exists("photo-1", "user_1").await.unwrap());
}

#[tokio::test]
async fn test_local_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = LocalLedgerStore::open(dir.path()).unwrap();
        store.insert("photo-1", "user_1").await.unwrap();
    }

    let store = LocalLedgerStore::open(dir.path()).unwrap();
    assert!(store.exists("photo-1", "user_1").await.unwrap());
    assert_eq!(store.recent(10).await.unwrap().len(), 1);
}
