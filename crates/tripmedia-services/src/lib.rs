//! TripMedia Services Layer
//!
//! Business services of the media pipeline: reverse geocoding and place
//! resolution, metadata extraction, the visibility policy, identity lookup and
//! the blob/record reconciliation sweep. HTTP handling stays in tripmedia-api.

pub mod extractor;
pub mod geocoding;
pub mod identity;
pub mod place_resolver;
pub mod reconciliation;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod visibility;

pub use extractor::MetadataExtractor;
pub use geocoding::{GeocodingError, NominatimClient, ReverseGeocoder};
pub use identity::{AuthServiceClient, IdentityError, IdentityResolver, AUTH_COOKIE};
pub use place_resolver::PlaceResolver;
pub use reconciliation::{ReconciliationReport, ReconciliationService};
pub use visibility::VisibilityPolicy;
