//! Service initialization and application state setup

use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tripmedia_core::Config;
use tripmedia_db::{FriendshipRepository, MediaRepository, PlaceRepository};
use tripmedia_services::{
    AuthServiceClient, NominatimClient, PlaceResolver, ReconciliationService, VisibilityPolicy,
};
use tripmedia_storage::Storage;

use crate::services::media_lifecycle::{LifecycleSettings, MediaLifecycleService};
use crate::state::{AppState, HttpConfig};

/// Room for multipart framing on top of the largest accepted file
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Wire repositories, outbound clients and the lifecycle into the application state
pub async fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let timeout = config.external_call_timeout();

    let media_repository = Arc::new(MediaRepository::new(pool.clone()));
    let place_repository = Arc::new(PlaceRepository::new(pool.clone()));
    let friendship_repository = Arc::new(FriendshipRepository::new(pool));

    let geocoder = NominatimClient::new(
        config.geocoding_base_url(),
        config.geocoding_user_agent(),
        timeout,
    )
    .context("Failed to create geocoding client")?;
    tracing::info!(base_url = %config.geocoding_base_url(), "Reverse geocoder configured");

    let identity = AuthServiceClient::new(config.auth_service_url(), timeout)
        .context("Failed to create auth service client")?;
    tracing::info!(base_url = %config.auth_service_url(), "Identity resolver configured");

    let resolver = Arc::new(PlaceResolver::new(Arc::new(geocoder), place_repository));
    let policy = VisibilityPolicy::new(friendship_repository, timeout);

    let media = MediaLifecycleService::new(
        media_repository.clone(),
        storage.clone(),
        resolver,
        policy,
        LifecycleSettings {
            max_file_size: config.max_file_size_bytes(),
            presigned_url_ttl: config.presigned_url_ttl(),
            blob_timeout: timeout,
        },
    );

    let reconciliation = if config.reconciliation_interval_secs() > 0 {
        let service = Arc::new(ReconciliationService::new(
            media_repository,
            storage,
            config.reconciliation_grace(),
        ));
        service.clone().start(std::time::Duration::from_secs(
            config.reconciliation_interval_secs(),
        ));
        tracing::info!(
            interval_secs = config.reconciliation_interval_secs(),
            grace_secs = config.reconciliation_grace().as_secs(),
            "Reconciliation sweep started"
        );
        Some(service)
    } else {
        tracing::info!("Reconciliation sweep disabled");
        None
    };

    Ok(Arc::new(AppState {
        media: Arc::new(media),
        identity: Arc::new(identity),
        reconciliation,
        http: HttpConfig {
            cors_origins: config.cors_origins().to_vec(),
            max_body_bytes: config.max_file_size_bytes() + MULTIPART_OVERHEAD_BYTES,
        },
    }))
}
