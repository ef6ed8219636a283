//! OpenAPI documentation, served at `/api/openapi.json` and rendered under `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tripmedia_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TripMedia API",
        version = "0.1.0",
        description = "Media attachments of trips: upload with GPS and capture-time extraction, place resolution, and per-media visibility (PUBLIC, PRIVATE, FRIENDS). Every /api route requires the auth_token session cookie or a Bearer token."
    ),
    paths(
        handlers::health::health,
        handlers::media_upload::upload_media,
        handlers::media_get::get_media_url,
        handlers::media_get::list_trip_media,
        handlers::media_get::get_media_location,
        handlers::media_metadata::amend_media_metadata,
        handlers::media_visibility::get_media_visibility,
        handlers::media_visibility::change_media_visibility,
        handlers::media_delete::delete_media,
    ),
    components(
        schemas(
            models::MediaKind,
            models::Visibility,
            models::Place,
            models::ExtractedMetadata,
            handlers::health::HealthResponse,
            handlers::media_upload::UploadResponse,
            handlers::media_get::UrlResponse,
            handlers::media_get::TripMediaItem,
            handlers::media_get::LocationResponse,
            handlers::media_metadata::AmendMetadataRequest,
            handlers::media_metadata::AmendMetadataResponse,
            handlers::media_visibility::ChangeVisibilityRequest,
            handlers::media_visibility::VisibilityResponse,
            handlers::media_delete::DeleteResponse,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "media", description = "Trip media upload, access and visibility"),
        (name = "config", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_media_routes() {
        let spec = ApiDoc::openapi();
        for path in [
            "/api/media/trip/{trip_id}",
            "/api/media/{media_id}",
            "/api/media/{media_id}/metadata",
            "/api/media/{media_id}/visibility",
            "/api/media/{media_id}/location",
            "/health",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
