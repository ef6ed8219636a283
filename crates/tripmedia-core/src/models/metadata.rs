use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::geo::GeoPoint;
use super::media::MediaKind;
use super::place::Place;

/// What one upload yielded after classification, tag decoding and place resolution.
///
/// Built per upload and consumed when the media record is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedMetadata {
    pub kind: MediaKind,
    pub place_id: Option<i64>,
    pub captured_at: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub city: String,
    pub country: String,
}

impl ExtractedMetadata {
    /// Zero coordinates, no place, captured "now".
    pub fn empty(kind: MediaKind, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            place_id: None,
            captured_at: now,
            latitude: 0.0,
            longitude: 0.0,
            altitude: 0.0,
            city: String::new(),
            country: String::new(),
        }
    }

    pub fn has_coordinates(&self) -> bool {
        !self.point().is_origin()
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude, self.altitude)
    }

    pub fn set_point(&mut self, point: GeoPoint) {
        self.latitude = point.latitude;
        self.longitude = point.longitude;
        self.altitude = point.altitude;
    }

    pub fn attach_place(&mut self, place: &Place) {
        self.place_id = Some(place.id);
        self.city = place.city.clone();
        self.country = place.country.clone();
    }

    /// No coordinates and no place names: the user has to set the location.
    pub fn lacks_location(&self) -> bool {
        !self.has_coordinates() && self.city.is_empty() && self.country.is_empty()
    }
}

/// Result of running the extractor over one upload.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Complete(ExtractedMetadata),
    /// Best-effort metadata is still returned alongside the signal
    NeedsManualLocation(ExtractedMetadata),
    Failed(String),
}

impl ExtractionOutcome {
    pub fn from_metadata(metadata: ExtractedMetadata) -> Self {
        if metadata.lacks_location() {
            ExtractionOutcome::NeedsManualLocation(metadata)
        } else {
            ExtractionOutcome::Complete(metadata)
        }
    }

    pub fn metadata(&self) -> Option<&ExtractedMetadata> {
        match self {
            ExtractionOutcome::Complete(m) | ExtractionOutcome::NeedsManualLocation(m) => Some(m),
            ExtractionOutcome::Failed(_) => None,
        }
    }

    pub fn requires_manual_location(&self) -> bool {
        matches!(self, ExtractionOutcome::NeedsManualLocation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExtractedMetadata {
        ExtractedMetadata::empty(MediaKind::Photo, Utc::now())
    }

    #[test]
    fn test_empty_metadata_needs_manual_location() {
        let outcome = ExtractionOutcome::from_metadata(sample());
        assert!(outcome.requires_manual_location());
        assert!(outcome.metadata().is_some());
    }

    #[test]
    fn test_coordinates_alone_are_enough() {
        let mut meta = sample();
        meta.latitude = 40.4168;
        meta.longitude = -3.7038;
        assert!(!ExtractionOutcome::from_metadata(meta).requires_manual_location());
    }

    #[test]
    fn test_place_names_alone_are_enough() {
        let mut meta = sample();
        meta.attach_place(&Place {
            id: 3,
            name: "Madrid, Spain".to_string(),
            country: "Spain".to_string(),
            city: "Madrid".to_string(),
        });
        let outcome = ExtractionOutcome::from_metadata(meta);
        assert!(matches!(outcome, ExtractionOutcome::Complete(ref m) if m.place_id == Some(3)));
    }

    #[test]
    fn test_failed_outcome_has_no_metadata() {
        let outcome = ExtractionOutcome::Failed("empty upload".to_string());
        assert!(outcome.metadata().is_none());
        assert!(!outcome.requires_manual_location());
    }
}
