//! photo-likes - photo catalog and like ledger for a photo-sharing gallery
//!
//! This crate provides a small HTTP API with:
//! - A photo catalog listed from Google Drive (or a local directory), cached in
//!   process with a TTL and served stale when the upstream listing fails
//! - A like ledger in Supabase (or a local redb file) allowing one like per
//!   photo and client fingerprint
//! - Summary, ranking and recent-activity statistics over the ledger

pub mod api;
pub mod catalog;
pub mod config;
pub mod fingerprint;
pub mod ledger;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use catalog::{CatalogCache, LocalSource};
use ledger::LikeLedger;

/// Shared application state. Components are `None` when their credentials are missing.
pub struct AppState {
    pub catalog: Option<CatalogCache>,
    pub ledger: Option<LikeLedger>,
    /// Set when photos are served from a local directory.
    pub local_photos: Option<Arc<LocalSource>>,
}
