use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tripmedia_core::models::Place;
use utoipa::ToSchema;

use crate::auth::RequesterContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson, ValidatedPath};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AmendMetadataRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AmendMetadataResponse {
    pub media_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    /// Absent when the place could not be resolved; the coordinates are stored anyway
    pub place: Option<Place>,
    pub location_resolved: bool,
}

/// Set the coordinates of a media manually and re-resolve its place
#[utoipa::path(
    post,
    path = "/api/media/{media_id}/metadata",
    tag = "media",
    params(
        ("media_id" = i64, Path, description = "Media ID")
    ),
    request_body = AmendMetadataRequest,
    responses(
        (status = 200, description = "Metadata updated", body = AmendMetadataResponse),
        (status = 400, description = "Invalid body", body = ErrorResponse),
        (status = 403, description = "Requester is not the owner", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, requester, body),
    fields(user_id = requester.user_id, operation = "amend_media_metadata")
)]
pub async fn amend_media_metadata(
    State(state): State<Arc<AppState>>,
    requester: RequesterContext,
    ValidatedPath(media_id): ValidatedPath<i64>,
    ValidatedJson(body): ValidatedJson<AmendMetadataRequest>,
) -> Result<Json<AmendMetadataResponse>, HttpAppError> {
    let outcome = state
        .media
        .amend_metadata(
            media_id,
            requester.user_id,
            body.latitude,
            body.longitude,
            body.altitude,
        )
        .await?;

    Ok(Json(AmendMetadataResponse {
        media_id: outcome.asset.id,
        latitude: outcome.asset.gps_latitude,
        longitude: outcome.asset.gps_longitude,
        altitude: outcome.asset.gps_altitude,
        location_resolved: outcome.place.is_some(),
        place: outcome.place,
    }))
}
