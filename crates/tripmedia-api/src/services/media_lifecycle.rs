//! Media lifecycle: upload, read, amend and delete across the blob store and the
//! media table.
//!
//! The two stores are not transactionally linked. Writes go blob first, then
//! record; any record failure after a blob mutation is reported as
//! `PersistenceFailed { reconciliation_required: true }` and left for the
//! reconciliation sweep.
//!
//! Keeps handler logic thin and allows unit testing without HTTP.

use bytes::Bytes;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tripmedia_core::models::{
    ExtractedMetadata, ExtractionOutcome, GeoPoint, LocationUpdate, MediaAsset, NewMediaAsset,
    Place, Visibility,
};
use tripmedia_core::AppError;
use tripmedia_db::MediaStore;
use tripmedia_processing::{classify, detect_content_type, UploadValidator};
use tripmedia_services::{MetadataExtractor, PlaceResolver, VisibilityPolicy};
use tripmedia_storage::{generate_storage_key, Storage, StorageError, StorageResult};

/// Presigns in flight at once while listing a trip
const LIST_CONCURRENCY: usize = 8;

/// Limits applied by the lifecycle
#[derive(Debug, Clone, Copy)]
pub struct LifecycleSettings {
    pub max_file_size: usize,
    pub presigned_url_ttl: Duration,
    /// Bound on every blob store call
    pub blob_timeout: Duration,
}

/// One file as received from the client
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub trip_id: i64,
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
    pub visibility: Visibility,
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub asset: MediaAsset,
    pub metadata: ExtractedMetadata,
    pub manual_location_required: bool,
}

#[derive(Debug, Clone)]
pub struct AmendOutcome {
    pub asset: MediaAsset,
    pub place: Option<Place>,
}

#[derive(Clone)]
pub struct MediaLifecycleService {
    media: Arc<dyn MediaStore>,
    storage: Arc<dyn Storage>,
    resolver: Arc<PlaceResolver>,
    extractor: MetadataExtractor,
    policy: VisibilityPolicy,
    validator: UploadValidator,
    settings: LifecycleSettings,
}

impl MediaLifecycleService {
    pub fn new(
        media: Arc<dyn MediaStore>,
        storage: Arc<dyn Storage>,
        resolver: Arc<PlaceResolver>,
        policy: VisibilityPolicy,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            extractor: MetadataExtractor::new(resolver.clone()),
            validator: UploadValidator::new(settings.max_file_size),
            media,
            storage,
            resolver,
            policy,
            settings,
        }
    }

    async fn with_blob_timeout<T>(
        &self,
        call: impl Future<Output = StorageResult<T>>,
    ) -> StorageResult<T> {
        match tokio::time::timeout(self.settings.blob_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StorageError::Timeout(self.settings.blob_timeout)),
        }
    }

    async fn load(&self, media_id: i64) -> Result<MediaAsset, AppError> {
        self.media
            .get(media_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", media_id)))
    }

    fn ensure_owner(asset: &MediaAsset, requester_id: i64) -> Result<(), AppError> {
        if asset.is_owned_by(requester_id) {
            Ok(())
        } else {
            Err(AppError::NotAuthorized(format!(
                "Only the owner may modify media {}",
                asset.id
            )))
        }
    }

    async fn load_readable(&self, media_id: i64, requester_id: i64) -> Result<MediaAsset, AppError> {
        let asset = self.load(media_id).await?;
        self.policy.authorize(&asset, requester_id).await?;
        Ok(asset)
    }

    async fn presign(&self, storage_key: &str) -> StorageResult<String> {
        self.with_blob_timeout(
            self.storage
                .get_presigned_url(storage_key, self.settings.presigned_url_ttl),
        )
        .await
    }

    /// Store the blob, derive its metadata and write the record.
    #[tracing::instrument(
        skip(self, request),
        fields(
            trip_id = request.trip_id,
            filename = %request.filename,
            declared_content_type = ?request.content_type,
            size_bytes = request.data.len()
        )
    )]
    pub async fn upload(
        &self,
        owner_id: i64,
        request: UploadRequest,
    ) -> Result<UploadOutcome, AppError> {
        if request.trip_id <= 0 {
            return Err(AppError::InvalidInput(format!(
                "Invalid trip id {}",
                request.trip_id
            )));
        }
        self.validator
            .validate(&request.filename, request.data.len())?;

        let storage_key = generate_storage_key(&request.filename);
        let content_type = request
            .content_type
            .as_deref()
            .or_else(|| detect_content_type(&request.data))
            .unwrap_or("application/octet-stream")
            .to_string();

        self.with_blob_timeout(
            self.storage
                .put(&storage_key, request.data.clone(), &content_type),
        )
        .await
        .map_err(|e| AppError::BlobStoreUnavailable(e.to_string()))?;

        let outcome = self
            .extractor
            .extract(
                &request.data,
                &request.filename,
                request.content_type.as_deref(),
            )
            .await;

        let (metadata, manual_location_required) = match outcome {
            ExtractionOutcome::Complete(metadata) => (metadata, false),
            ExtractionOutcome::NeedsManualLocation(metadata) => (metadata, true),
            ExtractionOutcome::Failed(reason) => {
                tracing::warn!(%storage_key, reason = %reason, "Metadata extraction failed");
                let kind = classify(&request.filename, &request.data);
                (ExtractedMetadata::empty(kind, Utc::now()), true)
            }
        };

        let new_asset = NewMediaAsset {
            trip_id: request.trip_id,
            user_id: owner_id,
            place_id: metadata.place_id,
            kind: metadata.kind,
            storage_key: storage_key.clone(),
            visibility: request.visibility,
            uploaded_at: Utc::now(),
            captured_at: metadata.captured_at,
            gps_latitude: metadata.latitude,
            gps_longitude: metadata.longitude,
            gps_altitude: metadata.altitude,
        };

        let asset = self.media.insert(new_asset).await.map_err(|e| {
            tracing::error!(error = %e, %storage_key, "Blob stored but media record was not");
            AppError::needs_reconciliation(format!("insert of {} failed: {}", storage_key, e))
        })?;

        tracing::info!(
            media_id = asset.id,
            kind = %asset.kind,
            place_id = ?asset.place_id,
            manual_location_required,
            "Media uploaded"
        );

        Ok(UploadOutcome {
            asset,
            metadata,
            manual_location_required,
        })
    }

    /// Short-lived read URL for a media the requester may see
    #[tracing::instrument(skip(self))]
    pub async fn get_url(&self, media_id: i64, requester_id: i64) -> Result<String, AppError> {
        let asset = self.load_readable(media_id, requester_id).await?;
        self.presign(&asset.storage_key)
            .await
            .map_err(|e| AppError::BlobStoreUnavailable(e.to_string()))
    }

    /// Owner-only. Sets coordinates and re-resolves the place; a failed lookup
    /// still stores the coordinates, with no place.
    #[tracing::instrument(skip(self))]
    pub async fn amend_metadata(
        &self,
        media_id: i64,
        requester_id: i64,
        latitude: f64,
        longitude: f64,
        altitude: f64,
    ) -> Result<AmendOutcome, AppError> {
        let asset = self.load(media_id).await?;
        Self::ensure_owner(&asset, requester_id)?;

        let point = GeoPoint::new(latitude, longitude, altitude);
        let place = if point.is_origin() {
            None
        } else {
            match self.resolver.resolve(point).await {
                Ok(place) => Some(place),
                Err(e) => {
                    tracing::warn!(error = %e, media_id, "Place resolution failed, storing coordinates only");
                    None
                }
            }
        };

        let update = LocationUpdate {
            latitude,
            longitude,
            altitude,
            place_id: place.as_ref().map(|p| p.id),
        };

        let asset = self
            .media
            .update_location(media_id, update)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", media_id)))?;

        Ok(AmendOutcome { asset, place })
    }

    /// Owner-only. Setting the current tier again is a no-op success.
    #[tracing::instrument(skip(self))]
    pub async fn change_visibility(
        &self,
        media_id: i64,
        requester_id: i64,
        visibility: Visibility,
    ) -> Result<MediaAsset, AppError> {
        let asset = self.load(media_id).await?;
        Self::ensure_owner(&asset, requester_id)?;

        if asset.visibility == visibility {
            return Ok(asset);
        }

        self.media
            .update_visibility(media_id, visibility)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Media {} not found", media_id)))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_visibility(
        &self,
        media_id: i64,
        requester_id: i64,
    ) -> Result<Visibility, AppError> {
        Ok(self.load_readable(media_id, requester_id).await?.visibility)
    }

    /// Resolved place of a readable media; `NotFound` while unresolved.
    #[tracing::instrument(skip(self))]
    pub async fn get_location(&self, media_id: i64, requester_id: i64) -> Result<Place, AppError> {
        let asset = self.load_readable(media_id, requester_id).await?;
        let place_id = asset.place_id.ok_or_else(|| {
            AppError::NotFound(format!("Media {} has no resolved location", media_id))
        })?;

        self.resolver
            .get(place_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Place {} not found", place_id)))
    }

    /// Owner-only. Blob first, then record.
    #[tracing::instrument(skip(self))]
    pub async fn delete_completely(&self, media_id: i64, requester_id: i64) -> Result<(), AppError> {
        let asset = self.load(media_id).await?;
        Self::ensure_owner(&asset, requester_id)?;

        self.with_blob_timeout(self.storage.delete(&asset.storage_key))
            .await
            .map_err(|e| AppError::StorageDeleteFailed(e.to_string()))?;

        match self.media.delete(media_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(media_id, "Media record already gone after blob delete");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    media_id,
                    storage_key = %asset.storage_key,
                    "Blob deleted but media record was not"
                );
                return Err(AppError::needs_reconciliation(format!(
                    "delete of media {} failed: {}",
                    media_id, e
                )));
            }
        }

        tracing::info!(media_id, storage_key = %asset.storage_key, "Media deleted");
        Ok(())
    }

    /// Readable media of a trip with their URLs, oldest first. Media the
    /// requester may not see, or whose URL cannot be signed, are left out.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_trip(
        &self,
        trip_id: i64,
        requester_id: i64,
    ) -> Result<Vec<(i64, String)>, AppError> {
        let assets = self.media.list_by_trip(trip_id).await?;
        let total = assets.len();

        let items: Vec<(i64, String)> = stream::iter(assets)
            .map(|asset| async move {
                if !self
                    .policy
                    .is_authorized(asset.visibility, asset.user_id, requester_id)
                    .await
                {
                    return None;
                }
                match self.presign(&asset.storage_key).await {
                    Ok(url) => Some((asset.id, url)),
                    Err(e) => {
                        tracing::warn!(error = %e, media_id = asset.id, "Presign failed, omitting media");
                        None
                    }
                }
            })
            .buffered(LIST_CONCURRENCY)
            .filter_map(|item| async move { item })
            .collect()
            .await;

        tracing::debug!(total, visible = items.len(), "Trip media listed");
        Ok(items)
    }
}
