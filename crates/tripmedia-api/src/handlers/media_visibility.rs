use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tripmedia_core::models::Visibility;
use utoipa::ToSchema;

use crate::auth::RequesterContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson, ValidatedPath};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeVisibilityRequest {
    /// PUBLIC, PRIVATE or FRIENDS (case-insensitive)
    pub visibility: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VisibilityResponse {
    pub media_id: i64,
    pub visibility: Visibility,
}

#[utoipa::path(
    get,
    path = "/api/media/{media_id}/visibility",
    tag = "media",
    params(
        ("media_id" = i64, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Current visibility", body = VisibilityResponse),
        (status = 403, description = "Not visible to the requester", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, requester),
    fields(user_id = requester.user_id, operation = "get_media_visibility")
)]
pub async fn get_media_visibility(
    State(state): State<Arc<AppState>>,
    requester: RequesterContext,
    ValidatedPath(media_id): ValidatedPath<i64>,
) -> Result<Json<VisibilityResponse>, HttpAppError> {
    let visibility = state
        .media
        .get_visibility(media_id, requester.user_id)
        .await?;
    Ok(Json(VisibilityResponse {
        media_id,
        visibility,
    }))
}

#[utoipa::path(
    put,
    path = "/api/media/{media_id}/visibility",
    tag = "media",
    params(
        ("media_id" = i64, Path, description = "Media ID")
    ),
    request_body = ChangeVisibilityRequest,
    responses(
        (status = 200, description = "Visibility updated", body = VisibilityResponse),
        (status = 400, description = "Unknown visibility tier", body = ErrorResponse),
        (status = 403, description = "Requester is not the owner", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, requester, body),
    fields(user_id = requester.user_id, visibility = %body.visibility, operation = "change_media_visibility")
)]
pub async fn change_media_visibility(
    State(state): State<Arc<AppState>>,
    requester: RequesterContext,
    ValidatedPath(media_id): ValidatedPath<i64>,
    ValidatedJson(body): ValidatedJson<ChangeVisibilityRequest>,
) -> Result<Json<VisibilityResponse>, HttpAppError> {
    let visibility: Visibility = body.visibility.parse()?;
    let asset = state
        .media
        .change_visibility(media_id, requester.user_id, visibility)
        .await?;
    Ok(Json(VisibilityResponse {
        media_id: asset.id,
        visibility: asset.visibility,
    }))
}
