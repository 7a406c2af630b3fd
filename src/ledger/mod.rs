mod local;
pub mod models;
mod service;
mod supabase;
mod tables;

pub use local::LocalLedgerStore;
pub use service::{LikeError, LikeLedger, DEFAULT_LIMIT, SCAN_LIMIT};
pub use supabase::SupabaseStore;

use async_trait::async_trait;
use thiserror::Error;

use models::{InsertOutcome, LikeRecord};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Backend(String),
    #[error("Commit error: {0}")]
    Commit(Box<redb::CommitError>),
    #[error("Database error: {0}")]
    RedbDatabase(Box<redb::DatabaseError>),
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] rmp_serde::decode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] rmp_serde::encode::Error),
    #[error("Storage error: {0}")]
    Storage(Box<redb::StorageError>),
    #[error("Table error: {0}")]
    Table(Box<redb::TableError>),
    #[error("Transaction error: {0}")]
    Transaction(Box<redb::TransactionError>),
}

impl From<redb::CommitError> for LedgerError {
    fn from(e: redb::CommitError) -> Self {
        LedgerError::Commit(Box::new(e))
    }
}

impl From<redb::DatabaseError> for LedgerError {
    fn from(e: redb::DatabaseError) -> Self {
        LedgerError::RedbDatabase(Box::new(e))
    }
}

impl From<redb::StorageError> for LedgerError {
    fn from(e: redb::StorageError) -> Self {
        LedgerError::Storage(Box::new(e))
    }
}

impl From<redb::TableError> for LedgerError {
    fn from(e: redb::TableError) -> Self {
        LedgerError::Table(Box::new(e))
    }
}

impl From<redb::TransactionError> for LedgerError {
    fn from(e: redb::TransactionError) -> Self {
        LedgerError::Transaction(Box::new(e))
    }
}

/// Abstraction over the store holding like records.
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Whether a like exists for the pair.
    async fn exists(&self, photo_id: &str, user_fingerprint: &str) -> Result<bool, LedgerError>;

    /// Record a like. Stores that enforce pair uniqueness report `Duplicate`.
    async fn insert(
        &self,
        photo_id: &str,
        user_fingerprint: &str,
    ) -> Result<InsertOutcome, LedgerError>;

    /// Delete every like for the pair, returning how many were removed.
    async fn delete(&self, photo_id: &str, user_fingerprint: &str) -> Result<u64, LedgerError>;

    /// Exact count of likes, optionally restricted to one photo.
    async fn count(&self, photo_id: Option<&str>) -> Result<u64, LedgerError>;

    /// The `limit` most recent likes, newest first.
    async fn recent(&self, limit: usize) -> Result<Vec<LikeRecord>, LedgerError>;
}
