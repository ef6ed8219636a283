use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tripmedia_core::models::{LocationUpdate, MediaAsset, NewMediaAsset, Visibility};
use tripmedia_core::AppError;

use super::traits::MediaStore;

const MEDIA_COLUMNS: &str = "id, trip_id, user_id, place_id, kind, storage_key, visibility, \
     uploaded_at, captured_at, gps_latitude, gps_longitude, gps_altitude";

/// Repository for the `media` table
#[derive(Clone)]
pub struct MediaRepository {
    pool: PgPool,
}

impl MediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaStore for MediaRepository {
    #[tracing::instrument(skip(self, media), fields(db.table = "media", db.operation = "insert", trip_id = media.trip_id))]
    async fn insert(&self, media: NewMediaAsset) -> Result<MediaAsset, AppError> {
        let query = format!(
            r#"
            INSERT INTO media (trip_id, user_id, place_id, kind, storage_key, visibility,
                               uploaded_at, captured_at, gps_latitude, gps_longitude, gps_altitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );

        let asset = sqlx::query_as::<Postgres, MediaAsset>(&query)
            .bind(media.trip_id)
            .bind(media.user_id)
            .bind(media.place_id)
            .bind(media.kind)
            .bind(&media.storage_key)
            .bind(media.visibility)
            .bind(media.uploaded_at)
            .bind(media.captured_at)
            .bind(media.gps_latitude)
            .bind(media.gps_longitude)
            .bind(media.gps_altitude)
            .fetch_one(&self.pool)
            .await?;

        Ok(asset)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: i64) -> Result<Option<MediaAsset>, AppError> {
        let query = format!("SELECT {} FROM media WHERE id = $1", MEDIA_COLUMNS);
        let asset = sqlx::query_as::<Postgres, MediaAsset>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(asset)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn list_by_trip(&self, trip_id: i64) -> Result<Vec<MediaAsset>, AppError> {
        let query = format!(
            "SELECT {} FROM media WHERE trip_id = $1 ORDER BY uploaded_at ASC, id ASC",
            MEDIA_COLUMNS
        );
        let assets = sqlx::query_as::<Postgres, MediaAsset>(&query)
            .bind(trip_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(assets)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "update", db.record_id = %id))]
    async fn update_location(
        &self,
        id: i64,
        update: LocationUpdate,
    ) -> Result<Option<MediaAsset>, AppError> {
        let query = format!(
            r#"
            UPDATE media
            SET gps_latitude = $2, gps_longitude = $3, gps_altitude = $4, place_id = $5
            WHERE id = $1
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );

        let asset = sqlx::query_as::<Postgres, MediaAsset>(&query)
            .bind(id)
            .bind(update.latitude)
            .bind(update.longitude)
            .bind(update.altitude)
            .bind(update.place_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(asset)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "update", db.record_id = %id))]
    async fn update_visibility(
        &self,
        id: i64,
        visibility: Visibility,
    ) -> Result<Option<MediaAsset>, AppError> {
        let query = format!(
            "UPDATE media SET visibility = $2 WHERE id = $1 RETURNING {}",
            MEDIA_COLUMNS
        );

        let asset = sqlx::query_as::<Postgres, MediaAsset>(&query)
            .bind(id)
            .bind(visibility)
            .fetch_optional(&self.pool)
            .await?;

        Ok(asset)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM media WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "media", db.operation = "select"))]
    async fn list_storage_keys(&self) -> Result<Vec<String>, AppError> {
        let keys = sqlx::query_scalar::<Postgres, String>("SELECT storage_key FROM media")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }
}
