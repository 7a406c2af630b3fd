use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub catalog: CatalogConfig,
    pub ledger: LedgerConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogBackend {
    Drive,
    Local,
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub backend: CatalogBackend,
    /// Drive folder whose image children make up the catalog (required for drive)
    pub folder_id: Option<String>,
    /// Drive API key (required for drive)
    pub api_key: Option<String>,
    pub drive_api_url: String,
    /// Directory for local catalog backend
    pub local_photos_path: String,
    /// How long a fetched snapshot is served before a refetch is attempted
    pub cache_ttl_seconds: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerBackend {
    Local,
    Supabase,
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub table: String,
    /// Directory for the local (redb) ledger backend
    pub data_dir: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::Drive,
            folder_id: None,
            api_key: None,
            drive_api_url: "https://www.googleapis.com/drive/v3".to_string(),
            local_photos_path: "./photos".to_string(),
            cache_ttl_seconds: 60 * 60,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::Supabase,
            supabase_url: None,
            supabase_anon_key: None,
            table: "photo_likes".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Drive credentials, when both are present.
    pub fn drive_credentials(&self) -> Option<(&str, &str)> {
        Some((self.folder_id.as_deref()?, self.api_key.as_deref()?))
    }
}

impl LedgerConfig {
    /// Supabase endpoint and key, when both are present.
    pub fn supabase_credentials(&self) -> Option<(&str, &str)> {
        Some((
            self.supabase_url.as_deref()?,
            self.supabase_anon_key.as_deref()?,
        ))
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let catalog_backend = match std::env::var("CATALOG_BACKEND")
            .unwrap_or_else(|_| "drive".to_string())
            .to_lowercase()
            .as_str()
        {
            "local" => CatalogBackend::Local,
            _ => CatalogBackend::Drive,
        };

        let cache_ttl_seconds = std::env::var("CATALOG_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60 * 60);

        let ledger_backend = match std::env::var("LEDGER_BACKEND")
            .unwrap_or_else(|_| "supabase".to_string())
            .to_lowercase()
            .as_str()
        {
            "local" => LedgerBackend::Local,
            _ => LedgerBackend::Supabase,
        };

        let config = Config {
            bind_address,
            catalog: CatalogConfig {
                backend: catalog_backend,
                folder_id: non_empty_var("FOLDER_ID"),
                api_key: non_empty_var("API_KEY"),
                drive_api_url: std::env::var("DRIVE_API_URL")
                    .unwrap_or_else(|_| CatalogConfig::default().drive_api_url),
                local_photos_path: std::env::var("LOCAL_PHOTOS_PATH")
                    .unwrap_or_else(|_| "./photos".to_string()),
                cache_ttl_seconds,
            },
            ledger: LedgerConfig {
                backend: ledger_backend,
                supabase_url: non_empty_var("SUPABASE_URL"),
                supabase_anon_key: non_empty_var("SUPABASE_ANON_KEY"),
                table: std::env::var("LIKES_TABLE").unwrap_or_else(|_| "photo_likes".to_string()),
                data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.cache_ttl_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "CATALOG_CACHE_TTL_SECONDS must be greater than 0".to_string(),
            ));
        }

        if self.ledger.table.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "LIKES_TABLE cannot be empty".to_string(),
            ));
        }

        // Missing credentials leave the component unconfigured rather than
        // failing startup; requests that need it answer with a 500.
        if self.catalog.backend == CatalogBackend::Drive
            && self.catalog.drive_credentials().is_none()
        {
            tracing::warn!("FOLDER_ID or API_KEY is not set; photo catalog is unavailable");
        }

        if self.ledger.backend == LedgerBackend::Supabase
            && self.ledger.supabase_credentials().is_none()
        {
            tracing::warn!("SUPABASE_URL or SUPABASE_ANON_KEY is not set; likes are unavailable");
        }

        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
