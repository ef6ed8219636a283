//! Configuration module
//!
//! Environment-driven configuration for the media service: HTTP server, database,
//! blob storage, and the external identity and geocoding services.

use std::env;
use std::time::Duration;

use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const SERVER_PORT: u16 = 8084;
const MAX_FILE_SIZE_MB: usize = 100;
const PRESIGNED_URL_TTL_SECS: u64 = 300;
const EXTERNAL_CALL_TIMEOUT_SECS: u64 = 10;
const RECONCILIATION_INTERVAL_SECS: u64 = 3600;
const RECONCILIATION_GRACE_SECS: u64 = 3600;
const DEFAULT_BUCKET: &str = "trip-media";
const DEFAULT_AUTH_SERVICE_URL: &str = "http://localhost:8081";
const DEFAULT_GEOCODING_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_GEOCODING_USER_AGENT: &str = "TripMedia/1.0";

/// Server and database settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
}

/// Media service configuration
#[derive(Clone, Debug)]
pub struct MediaServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Blob storage
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: String,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // MinIO and other S3-compatible providers
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub presigned_url_ttl_secs: u64,
    // Uploads
    pub max_file_size_bytes: usize,
    // External services
    pub auth_service_url: String,
    pub geocoding_base_url: String,
    pub geocoding_user_agent: String,
    pub external_call_timeout_secs: u64,
    // Orphan blob / dangling record sweep. 0 disables the background loop.
    pub reconciliation_interval_secs: u64,
    pub reconciliation_grace_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediaServiceConfig>);

impl Config {
    fn as_media(&self) -> &MediaServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment().to_lowercase();
        env == "production" || env == "prod"
    }

    /// Load configuration from environment variables (and `.env` when present)
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Ok(Config(Box::new(MediaServiceConfig::from_env()?)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_media().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_media().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_media().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_media().base.environment
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_media().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_media().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.as_media().database_url
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_media().storage_backend
    }

    pub fn s3_bucket(&self) -> &str {
        &self.as_media().s3_bucket
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_media().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_media().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_media().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_media().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_media().local_storage_base_url.as_deref()
    }

    pub fn presigned_url_ttl(&self) -> Duration {
        Duration::from_secs(self.as_media().presigned_url_ttl_secs)
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_media().max_file_size_bytes
    }

    pub fn auth_service_url(&self) -> &str {
        &self.as_media().auth_service_url
    }

    pub fn geocoding_base_url(&self) -> &str {
        &self.as_media().geocoding_base_url
    }

    pub fn geocoding_user_agent(&self) -> &str {
        &self.as_media().geocoding_user_agent
    }

    pub fn external_call_timeout(&self) -> Duration {
        Duration::from_secs(self.as_media().external_call_timeout_secs)
    }

    pub fn reconciliation_interval_secs(&self) -> u64 {
        self.as_media().reconciliation_interval_secs
    }

    pub fn reconciliation_grace(&self) -> Duration {
        Duration::from_secs(self.as_media().reconciliation_grace_secs)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl MediaServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", MAX_CONNECTIONS),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", CONNECTION_TIMEOUT_SECS),
            environment,
        };

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => Some(value.parse::<StorageBackend>()?),
            Err(_) => None,
        };

        let max_file_size_mb: usize = env_or("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB);

        let config = MediaServiceConfig {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: env::var("S3_BUCKET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            aws_region: env::var("AWS_REGION").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            presigned_url_ttl_secs: env_or("PRESIGNED_URL_TTL_SECS", PRESIGNED_URL_TTL_SECS),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            auth_service_url: env::var("AUTH_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_SERVICE_URL.to_string()),
            geocoding_base_url: env::var("GEOCODING_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEOCODING_BASE_URL.to_string()),
            geocoding_user_agent: env::var("GEOCODING_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_GEOCODING_USER_AGENT.to_string()),
            external_call_timeout_secs: env_or(
                "EXTERNAL_CALL_TIMEOUT_SECS",
                EXTERNAL_CALL_TIMEOUT_SECS,
            ),
            reconciliation_interval_secs: env_or(
                "RECONCILIATION_INTERVAL_SECS",
                RECONCILIATION_INTERVAL_SECS,
            ),
            reconciliation_grace_secs: env_or(
                "RECONCILIATION_GRACE_SECS",
                RECONCILIATION_GRACE_SECS,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.presigned_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_TTL_SECS must be greater than 0"
            ));
        }

        if self.external_call_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "EXTERNAL_CALL_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.geocoding_user_agent.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "GEOCODING_USER_AGENT must identify this client"
            ));
        }

        match self.storage_backend.unwrap_or(StorageBackend::S3) {
            StorageBackend::S3 => {
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
