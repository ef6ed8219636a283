//! Reverse geocoding against a Nominatim-compatible endpoint

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tripmedia_core::models::{GeoPoint, PlaceName};

#[derive(Debug, thiserror::Error)]
pub enum GeocodingError {
    #[error("Geocoder unreachable: {0}")]
    Unreachable(String),

    #[error("Geocoder timed out")]
    Timeout,

    #[error("Geocoder returned status {0}")]
    Status(u16),

    #[error("Malformed geocoder response: {0}")]
    Malformed(String),
}

/// Coordinates in, city/country out. Empty names are a valid answer.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, point: GeoPoint) -> Result<PlaceName, GeocodingError>;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Address>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    country: Option<String>,
}

impl Address {
    /// Smaller settlements report `town` or `village` instead of `city`.
    fn into_place_name(self) -> PlaceName {
        let city = self
            .city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .unwrap_or_default();
        PlaceName::new(city, self.country.unwrap_or_default())
    }
}

/// Nominatim `/reverse` client
#[derive(Clone)]
pub struct NominatimClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// `user_agent` must identify this service; the public Nominatim instance
    /// rejects anonymous clients.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client for reverse geocoding")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    #[tracing::instrument(skip(self), fields(lat = point.latitude, lon = point.longitude))]
    async fn reverse(&self, point: GeoPoint) -> Result<PlaceName, GeocodingError> {
        let url = format!("{}/reverse", self.base_url);
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
                ("zoom", "10".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodingError::Timeout
                } else {
                    GeocodingError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::Status(status.as_u16()));
        }

        let body: ReverseResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GeocodingError::Timeout
            } else {
                GeocodingError::Malformed(e.to_string())
            }
        })?;

        let place = body.address.unwrap_or_default().into_place_name();

        tracing::debug!(
            city = %place.city,
            country = %place.country,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Reverse geocoding completed"
        );

        Ok(place)
    }
}
