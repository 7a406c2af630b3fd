use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use redb::{Database as RedbDatabase, ReadableTable, ReadableTableMetadata};
use std::path::Path;
use std::sync::Arc;

use super::models::{InsertOutcome, LikeRecord, StoredLike};
use super::tables::*;
use super::{LedgerError, LikeStore};

/// Embedded redb ledger for development and testing.
///
/// Likes are keyed by (photo_id, user_fingerprint), so the existence check and
/// the insert happen in one write transaction and duplicates cannot occur.
pub struct LocalLedgerStore {
    db: Arc<RedbDatabase>,
}

impl Clone for LocalLedgerStore {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl LocalLedgerStore {
    /// Open or create the ledger in the given directory
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, LedgerError> {
        std::fs::create_dir_all(data_dir.as_ref())?;
        let db_path = data_dir.as_ref().join("photo-likes.redb");
        let db = Arc::new(RedbDatabase::create(db_path)?);

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(LIKES)?;
            let _ = write_txn.open_table(COUNTERS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn all_likes(&self) -> Result<Vec<(String, String, StoredLike)>, LedgerError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LIKES)?;

        let mut likes = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            let (photo_id, user_fingerprint) = key.value();
            let stored: StoredLike = rmp_serde::from_slice(value.value())?;
            likes.push((photo_id.to_string(), user_fingerprint.to_string(), stored));
        }
        Ok(likes)
    }
}

#[async_trait]
impl LikeStore for LocalLedgerStore {
    async fn exists(&self, photo_id: &str, user_fingerprint: &str) -> Result<bool, LedgerError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LIKES)?;
        let found = table.get((photo_id, user_fingerprint))?.is_some();
        Ok(found)
    }

    async fn insert(
        &self,
        photo_id: &str,
        user_fingerprint: &str,
    ) -> Result<InsertOutcome, LedgerError> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(LIKES)?;
            let present = table.get((photo_id, user_fingerprint))?.is_some();
            if present {
                InsertOutcome::Duplicate
            } else {
                let mut counters = write_txn.open_table(COUNTERS)?;
                let sequence = counters.get(NEXT_SEQUENCE)?.map(|v| v.value()).unwrap_or(0);
                counters.insert(NEXT_SEQUENCE, sequence + 1)?;

                let stored = StoredLike {
                    created_at: Utc::now(),
                    sequence,
                };
                let data = rmp_serde::to_vec_named(&stored)?;
                table.insert((photo_id, user_fingerprint), data.as_slice())?;
                InsertOutcome::Inserted
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }

    async fn delete(&self, photo_id: &str, user_fingerprint: &str) -> Result<u64, LedgerError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(LIKES)?;
            let removed = table.remove((photo_id, user_fingerprint))?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(u64::from(removed))
    }

    async fn count(&self, photo_id: Option<&str>) -> Result<u64, LedgerError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LIKES)?;

        let Some(photo_id) = photo_id else {
            return Ok(table.len()?);
        };

        let mut count = 0;
        for entry in table.range((photo_id, "")..)? {
            let (key, _) = entry?;
            if key.value().0 != photo_id {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<LikeRecord>, LedgerError> {
        let mut likes = self.all_likes()?;
        likes.sort_by(|(_, _, a), (_, _, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.sequence.cmp(&a.sequence))
        });
        likes.truncate(limit);

        Ok(likes
            .into_iter()
            .map(|(photo_id, user_fingerprint, stored)| LikeRecord {
                photo_id,
                user_fingerprint,
                created_at: stored.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            })
            .collect())
    }
}
