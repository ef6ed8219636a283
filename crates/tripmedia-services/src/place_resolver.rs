use std::sync::Arc;
use tripmedia_core::models::{GeoPoint, Place};
use tripmedia_core::AppError;
use tripmedia_db::PlaceStore;

use crate::geocoding::ReverseGeocoder;

/// Turns coordinates into a canonical [`Place`], creating it on first sight.
///
/// Lookup goes through the place table first; only a miss writes. Concurrent
/// misses for the same (country, city) converge on one row through the store's
/// upsert.
#[derive(Clone)]
pub struct PlaceResolver {
    geocoder: Arc<dyn ReverseGeocoder>,
    places: Arc<dyn PlaceStore>,
}

impl PlaceResolver {
    pub fn new(geocoder: Arc<dyn ReverseGeocoder>, places: Arc<dyn PlaceStore>) -> Self {
        Self { geocoder, places }
    }

    #[tracing::instrument(skip(self), fields(lat = point.latitude, lon = point.longitude))]
    pub async fn resolve(&self, point: GeoPoint) -> Result<Place, AppError> {
        let name = self
            .geocoder
            .reverse(point)
            .await
            .map_err(|e| AppError::LocationLookupFailed(e.to_string()))?;

        if let Some(place) = self
            .places
            .find_by_country_city(&name.country, &name.city)
            .await?
        {
            tracing::debug!(place_id = place.id, "Place cache hit");
            return Ok(place);
        }

        let place = self
            .places
            .upsert(&name.display_name(), &name.country, &name.city)
            .await?;

        tracing::info!(
            place_id = place.id,
            city = %place.city,
            country = %place.country,
            "Place created"
        );

        Ok(place)
    }

    pub async fn get(&self, place_id: i64) -> Result<Option<Place>, AppError> {
        self.places.get(place_id).await
    }
}
