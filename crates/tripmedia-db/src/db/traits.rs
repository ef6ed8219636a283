use async_trait::async_trait;
use tripmedia_core::models::{LocationUpdate, MediaAsset, NewMediaAsset, Place, Visibility};
use tripmedia_core::AppError;

/// Persistence of media records
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn insert(&self, media: NewMediaAsset) -> Result<MediaAsset, AppError>;

    async fn get(&self, id: i64) -> Result<Option<MediaAsset>, AppError>;

    /// Assets of one trip, oldest upload first
    async fn list_by_trip(&self, trip_id: i64) -> Result<Vec<MediaAsset>, AppError>;

    /// Returns `None` when no record has this id
    async fn update_location(
        &self,
        id: i64,
        update: LocationUpdate,
    ) -> Result<Option<MediaAsset>, AppError>;

    /// Returns `None` when no record has this id
    async fn update_visibility(
        &self,
        id: i64,
        visibility: Visibility,
    ) -> Result<Option<MediaAsset>, AppError>;

    /// Returns whether a record was removed
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Every storage key referenced by a record
    async fn list_storage_keys(&self) -> Result<Vec<String>, AppError>;
}

/// Persistence of resolved places
#[async_trait]
pub trait PlaceStore: Send + Sync {
    async fn find_by_country_city(
        &self,
        country: &str,
        city: &str,
    ) -> Result<Option<Place>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Place>, AppError>;

    /// Insert the place, or return the row another writer already created for
    /// the same (country, city).
    async fn upsert(&self, name: &str, country: &str, city: &str) -> Result<Place, AppError>;
}

/// Friendship lookup. Either direction of the relation counts.
#[async_trait]
pub trait FriendshipStore: Send + Sync {
    async fn are_friends(&self, user_id: i64, other_id: i64) -> Result<bool, AppError>;
}
