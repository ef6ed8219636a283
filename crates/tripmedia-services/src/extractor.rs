use chrono::Utc;
use std::sync::Arc;
use tripmedia_core::models::{ExtractedMetadata, ExtractionOutcome, MediaKind};
use tripmedia_processing::{classify, decode_photo_tags};

use crate::place_resolver::PlaceResolver;

/// Derives kind, capture time, coordinates and place for one upload.
///
/// Every step is best-effort: undecodable tags or an unreachable geocoder
/// leave fields at their defaults instead of failing.
#[derive(Clone)]
pub struct MetadataExtractor {
    resolver: Arc<PlaceResolver>,
}

impl MetadataExtractor {
    pub fn new(resolver: Arc<PlaceResolver>) -> Self {
        Self { resolver }
    }

    /// `declared_content_type` is the client's hint; it is logged but classification
    /// only trusts the extension and the bytes.
    #[tracing::instrument(skip(self, data), fields(size_bytes = data.len()))]
    pub async fn extract(
        &self,
        data: &[u8],
        filename: &str,
        declared_content_type: Option<&str>,
    ) -> ExtractionOutcome {
        if data.is_empty() {
            return ExtractionOutcome::Failed("empty file".to_string());
        }

        let kind = classify(filename, data);
        let mut metadata = ExtractedMetadata::empty(kind, Utc::now());

        if kind == MediaKind::Photo {
            match decode_photo_tags(data) {
                Some(tags) => {
                    if let Some(captured_at) = tags.captured_at {
                        metadata.captured_at = captured_at;
                    }
                    if let Some(point) = tags.gps {
                        metadata.set_point(point);
                    }
                }
                None => tracing::debug!(filename, "Photo carries no readable tags"),
            }
        }

        if metadata.has_coordinates() {
            match self.resolver.resolve(metadata.point()).await {
                Ok(place) => metadata.attach_place(&place),
                Err(e) => tracing::warn!(
                    error = %e,
                    lat = metadata.latitude,
                    lon = metadata.longitude,
                    "Place resolution failed, continuing without location"
                ),
            }
        }

        let outcome = ExtractionOutcome::from_metadata(metadata);
        tracing::debug!(
            kind = %kind,
            manual_location_required = outcome.requires_manual_location(),
            "Metadata extracted"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::FakeGeocoder;
    use tripmedia_core::models::PlaceName;
    use tripmedia_db::test_helpers::InMemoryPlaceStore;
    use tripmedia_processing::fixtures::{jpeg_without_gps, madrid_jpeg};

    fn extractor(geocoder: FakeGeocoder) -> MetadataExtractor {
        let resolver = PlaceResolver::new(Arc::new(geocoder), Arc::new(InMemoryPlaceStore::new()));
        MetadataExtractor::new(Arc::new(resolver))
    }

    #[tokio::test]
    async fn test_photo_with_gps_resolves_place() {
        let geocoder = FakeGeocoder::new();
        geocoder.set_default(PlaceName::new("Madrid", "Spain"));

        let outcome = extractor(geocoder)
            .extract(&madrid_jpeg(), "IMG_0001.jpg", Some("image/jpeg"))
            .await;

        let ExtractionOutcome::Complete(meta) = outcome else {
            panic!("expected complete metadata, got {:?}", outcome);
        };
        assert_eq!(meta.kind, MediaKind::Photo);
        assert!((meta.latitude - 40.4168).abs() < 1e-6);
        assert!((meta.longitude - -3.7038).abs() < 1e-6);
        assert_eq!(meta.city, "Madrid");
        assert_eq!(meta.country, "Spain");
        assert!(meta.place_id.is_some());
        assert_eq!(meta.captured_at.to_rfc3339(), "2023-07-14T18:30:05+00:00");
    }

    #[tokio::test]
    async fn test_geocoder_down_keeps_coordinates() {
        let geocoder = FakeGeocoder::new();
        geocoder.fail(true);

        let outcome = extractor(geocoder)
            .extract(&madrid_jpeg(), "IMG_0001.jpg", None)
            .await;

        let ExtractionOutcome::Complete(meta) = outcome else {
            panic!("expected complete metadata, got {:?}", outcome);
        };
        assert!(meta.place_id.is_none());
        assert!(meta.city.is_empty());
        assert!(meta.has_coordinates());
    }

    #[tokio::test]
    async fn test_photo_without_gps_needs_manual_location() {
        let geocoder = FakeGeocoder::new();
        let outcome = extractor(geocoder.clone())
            .extract(&jpeg_without_gps(), "IMG_0002.jpg", None)
            .await;

        assert!(outcome.requires_manual_location());
        let meta = outcome.metadata().unwrap();
        assert_eq!(meta.captured_at.to_rfc3339(), "2022-05-01T09:00:00+00:00");
        assert_eq!(geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn test_video_needs_manual_location() {
        let before = Utc::now();
        let outcome = extractor(FakeGeocoder::new())
            .extract(b"\0\0\0\x18ftypmp42\0\0\0\0", "clip.mp4", Some("video/mp4"))
            .await;

        let ExtractionOutcome::NeedsManualLocation(meta) = outcome else {
            panic!("expected manual location, got {:?}", outcome);
        };
        assert_eq!(meta.kind, MediaKind::Video);
        assert_eq!((meta.latitude, meta.longitude, meta.altitude), (0.0, 0.0, 0.0));
        assert!(meta.captured_at >= before);
    }

    #[tokio::test]
    async fn test_empty_file_fails() {
        let outcome = extractor(FakeGeocoder::new())
            .extract(b"", "empty.jpg", None)
            .await;
        assert!(matches!(outcome, ExtractionOutcome::Failed(_)));
    }
}
