use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::{CatalogError, CatalogSource, PhotoEntry};

pub const STALE_WARNING: &str = "Returned cached data due to error";

/// A point-in-time copy of the full catalog.
#[derive(Debug)]
pub struct CacheSnapshot {
    pub entries: Vec<PhotoEntry>,
    pub fetched_at: DateTime<Utc>,
}

/// The catalog as handed to a request.
#[derive(Debug, Clone)]
pub struct CatalogView {
    pub snapshot: Arc<CacheSnapshot>,
    pub cached: bool,
    /// Age of the snapshot; only set when it was served from cache.
    pub cache_age: Option<Duration>,
    /// Set when a refetch failed and a stale snapshot was served instead.
    pub warning: Option<&'static str>,
}

impl CatalogView {
    pub fn entries(&self) -> &[PhotoEntry] {
        &self.snapshot.entries
    }
}

/// Process-wide catalog cache with a time-to-live and stale-on-error fallback.
///
/// The snapshot is only ever replaced wholesale. Concurrent misses may each
/// refetch; the last successful fetch wins.
pub struct CatalogCache {
    snapshot: RwLock<Option<Arc<CacheSnapshot>>>,
    source: Arc<dyn CatalogSource>,
    ttl: Duration,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>, ttl: std::time::Duration) -> Self {
        Self {
            snapshot: RwLock::new(None),
            source,
            ttl: Duration::from_std(ttl).unwrap_or(Duration::hours(1)),
        }
    }

    pub async fn get_catalog(&self) -> Result<CatalogView, CatalogError> {
        self.get_catalog_at(Utc::now()).await
    }

    /// Serve the catalog as of `now`, refetching when the snapshot is absent or expired.
    pub async fn get_catalog_at(&self, now: DateTime<Utc>) -> Result<CatalogView, CatalogError> {
        let current = self.snapshot.read().await.clone();

        if let Some(ref snapshot) = current {
            let age = now - snapshot.fetched_at;
            if age < self.ttl {
                tracing::debug!(age_seconds = age.num_seconds(), "Serving cached catalog");
                return Ok(CatalogView {
                    snapshot: Arc::clone(snapshot),
                    cached: true,
                    cache_age: Some(age),
                    warning: None,
                });
            }
        }

        tracing::info!("Fetching fresh catalog");
        match fetch_all_entries(self.source.as_ref()).await {
            Ok(entries) => {
                tracing::info!(entries = entries.len(), "Fetched catalog");
                let fresh = Arc::new(CacheSnapshot {
                    entries,
                    fetched_at: now,
                });
                *self.snapshot.write().await = Some(Arc::clone(&fresh));
                Ok(CatalogView {
                    snapshot: fresh,
                    cached: false,
                    cache_age: None,
                    warning: None,
                })
            }
            Err(e) => match current {
                Some(stale) => {
                    tracing::warn!(error = %e, "Catalog refetch failed, serving stale snapshot");
                    Ok(CatalogView {
                        cache_age: Some(now - stale.fetched_at),
                        snapshot: stale,
                        cached: true,
                        warning: Some(STALE_WARNING),
                    })
                }
                None => {
                    tracing::error!(error = %e, "Catalog fetch failed with no snapshot to fall back on");
                    Err(e)
                }
            },
        }
    }
}

/// Walk every page of the listing in order. Any failing page aborts the whole fetch.
pub async fn fetch_all_entries(source: &dyn CatalogSource) -> Result<Vec<PhotoEntry>, CatalogError> {
    let mut entries = Vec::new();
    let mut page_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = source.list_page(page_token.as_deref()).await?;
        pages += 1;

        entries.extend(page.files.into_iter().map(|file| PhotoEntry {
            url: source.thumbnail_url(&file.id),
            id: file.id,
            name: file.name,
        }));

        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    tracing::debug!(pages, entries = entries.len(), "Listed catalog");
    Ok(entries)
}
