use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use tripmedia_core::models::Place;
use utoipa::ToSchema;

use crate::auth::RequesterContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedPath};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct UrlResponse {
    /// Presigned read URL, valid for a few minutes
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TripMediaItem {
    pub media_id: i64,
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationResponse {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub country: String,
}

impl From<Place> for LocationResponse {
    fn from(place: Place) -> Self {
        Self {
            id: place.id,
            name: place.name,
            city: place.city,
            country: place.country,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/media/{media_id}",
    tag = "media",
    params(
        ("media_id" = i64, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Presigned URL", body = UrlResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 403, description = "Not visible to the requester", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, requester),
    fields(user_id = requester.user_id, operation = "get_media_url")
)]
pub async fn get_media_url(
    State(state): State<Arc<AppState>>,
    requester: RequesterContext,
    ValidatedPath(media_id): ValidatedPath<i64>,
) -> Result<Json<UrlResponse>, HttpAppError> {
    let url = state.media.get_url(media_id, requester.user_id).await?;
    Ok(Json(UrlResponse { url }))
}

#[utoipa::path(
    get,
    path = "/api/media/trip/{trip_id}",
    tag = "media",
    params(
        ("trip_id" = i64, Path, description = "Trip ID")
    ),
    responses(
        (status = 200, description = "Media of the trip visible to the requester", body = Vec<TripMediaItem>),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, requester),
    fields(user_id = requester.user_id, operation = "list_trip_media")
)]
pub async fn list_trip_media(
    State(state): State<Arc<AppState>>,
    requester: RequesterContext,
    ValidatedPath(trip_id): ValidatedPath<i64>,
) -> Result<Json<Vec<TripMediaItem>>, HttpAppError> {
    let items = state
        .media
        .list_by_trip(trip_id, requester.user_id)
        .await?
        .into_iter()
        .map(|(media_id, url)| TripMediaItem { media_id, url })
        .collect();
    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/api/media/{media_id}/location",
    tag = "media",
    params(
        ("media_id" = i64, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Resolved place", body = LocationResponse),
        (status = 403, description = "Not visible to the requester", body = ErrorResponse),
        (status = 404, description = "Media not found or location unresolved", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, requester),
    fields(user_id = requester.user_id, operation = "get_media_location")
)]
pub async fn get_media_location(
    State(state): State<Arc<AppState>>,
    requester: RequesterContext,
    ValidatedPath(media_id): ValidatedPath<i64>,
) -> Result<Json<LocationResponse>, HttpAppError> {
    let place = state.media.get_location(media_id, requester.user_id).await?;
    Ok(Json(place.into()))
}
