use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photo_likes::{
    api,
    catalog::{CatalogCache, CatalogSource, DriveSource, LocalSource},
    config::{CatalogBackend, Config, LedgerBackend},
    ledger::{LikeLedger, LikeStore, LocalLedgerStore, SupabaseStore},
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "photo-likes starting");

    let config = Config::load()?;

    // Photo catalog
    let mut local_photos = None;
    let source: Option<Arc<dyn CatalogSource>> = match config.catalog.backend {
        CatalogBackend::Local => {
            let source = Arc::new(LocalSource::new(&config.catalog.local_photos_path)?);
            info!(
                "Using local catalog at: {}",
                config.catalog.local_photos_path
            );
            local_photos = Some(Arc::clone(&source));
            Some(source)
        }
        CatalogBackend::Drive => match config.catalog.drive_credentials() {
            Some((folder_id, api_key)) => {
                let source =
                    DriveSource::new(&config.catalog.drive_api_url, folder_id, api_key)?;
                info!("Using Google Drive catalog");
                Some(Arc::new(source))
            }
            None => None,
        },
    };
    let catalog = source.map(|source| {
        CatalogCache::new(
            source,
            Duration::from_secs(config.catalog.cache_ttl_seconds),
        )
    });

    // Like ledger
    let store: Option<Arc<dyn LikeStore>> = match config.ledger.backend {
        LedgerBackend::Local => {
            let store = LocalLedgerStore::open(&config.ledger.data_dir)?;
            info!("Using local ledger at: {}", config.ledger.data_dir);
            Some(Arc::new(store))
        }
        LedgerBackend::Supabase => match config.ledger.supabase_credentials() {
            Some((url, key)) => {
                let store = SupabaseStore::new(url, key, &config.ledger.table)?;
                info!(table = %config.ledger.table, "Using Supabase ledger");
                Some(Arc::new(store))
            }
            None => None,
        },
    };
    let ledger = store.map(LikeLedger::new);

    let state = Arc::new(AppState {
        catalog,
        ledger,
        local_photos,
    });

    // Build and start the HTTP server
    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on: {}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
