//! Domain models for trip media
//!
//! - `geo`: plain coordinates
//! - `media`: stored assets, their kind and visibility tier
//! - `place`: deduplicated (country, city) places
//! - `metadata`: per-upload extraction results

mod geo;
mod media;
mod metadata;
mod place;

pub use geo::GeoPoint;
pub use media::{LocationUpdate, MediaAsset, MediaKind, NewMediaAsset, Visibility};
pub use metadata::{ExtractedMetadata, ExtractionOutcome};
pub use place::{Place, PlaceName};
