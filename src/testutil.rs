//! Shared test helpers for router tests.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{CatalogCache, LocalSource};
use crate::ledger::{LikeLedger, LocalLedgerStore};
use crate::AppState;

/// Create a test AppState backed by a temporary photo directory and redb ledger.
/// The directory holds two images (`alpha.jpg`, `beta.png`) and one non-image.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let photos_dir = temp_dir.path().join("photos");

    let source = Arc::new(LocalSource::new(&photos_dir).expect("Failed to create photo dir"));
    std::fs::write(photos_dir.join("alpha.jpg"), b"jpeg-bytes").expect("Failed to write photo");
    std::fs::write(photos_dir.join("beta.png"), b"png-bytes").expect("Failed to write photo");
    std::fs::write(photos_dir.join("notes.txt"), b"not a photo").expect("Failed to write file");

    let store = LocalLedgerStore::open(&data_dir).expect("Failed to open test ledger");

    Arc::new(AppState {
        catalog: Some(CatalogCache::new(source.clone(), Duration::from_secs(3600))),
        ledger: Some(LikeLedger::new(Arc::new(store))),
        local_photos: Some(source),
    })
}

/// AppState with no backends configured.
pub fn unconfigured_state() -> Arc<AppState> {
    Arc::new(AppState {
        catalog: None,
        ledger: None,
        local_photos: None,
    })
}
