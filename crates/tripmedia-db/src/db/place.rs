use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tripmedia_core::models::Place;
use tripmedia_core::AppError;

use super::traits::PlaceStore;

/// Repository for the `places` table
#[derive(Clone)]
pub struct PlaceRepository {
    pool: PgPool,
}

impl PlaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaceStore for PlaceRepository {
    #[tracing::instrument(skip(self), fields(db.table = "places", db.operation = "select"))]
    async fn find_by_country_city(
        &self,
        country: &str,
        city: &str,
    ) -> Result<Option<Place>, AppError> {
        let place = sqlx::query_as::<Postgres, Place>(
            "SELECT id, name, country, city FROM places WHERE country = $1 AND city = $2",
        )
        .bind(country)
        .bind(city)
        .fetch_optional(&self.pool)
        .await?;

        Ok(place)
    }

    #[tracing::instrument(skip(self), fields(db.table = "places", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: i64) -> Result<Option<Place>, AppError> {
        let place = sqlx::query_as::<Postgres, Place>(
            "SELECT id, name, country, city FROM places WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(place)
    }

    #[tracing::instrument(skip(self), fields(db.table = "places", db.operation = "upsert"))]
    async fn upsert(&self, name: &str, country: &str, city: &str) -> Result<Place, AppError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let place = sqlx::query_as::<Postgres, Place>(
            r#"
            INSERT INTO places (name, country, city)
            VALUES ($1, $2, $3)
            ON CONFLICT (country, city) DO UPDATE SET name = places.name
            RETURNING id, name, country, city
            "#,
        )
        .bind(name)
        .bind(country)
        .bind(city)
        .fetch_one(&self.pool)
        .await?;

        Ok(place)
    }
}
