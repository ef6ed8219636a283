use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// A deduplicated (country, city) pair produced by reverse geocoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub city: String,
}

/// Address fields returned by a reverse geocoder. Either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceName {
    pub city: String,
    pub country: String,
}

impl PlaceName {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.city.is_empty() && self.country.is_empty()
    }

    /// Human readable "city, country", skipping whichever part is missing.
    pub fn display_name(&self) -> String {
        match (self.city.is_empty(), self.country.is_empty()) {
            (false, false) => format!("{}, {}", self.city, self.country),
            (false, true) => self.city.clone(),
            (true, false) => self.country.clone(),
            (true, true) => String::new(),
        }
    }
}
