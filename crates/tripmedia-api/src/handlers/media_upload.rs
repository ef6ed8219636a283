use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tripmedia_core::models::{ExtractedMetadata, Visibility};
use utoipa::ToSchema;

use crate::auth::RequesterContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedPath};
use crate::services::media_lifecycle::UploadRequest;
use crate::state::AppState;
use crate::utils::upload::extract_upload_form;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub media_id: i64,
    pub storage_key: String,
    pub visibility: Visibility,
    pub metadata: ExtractedMetadata,
    /// Set when neither coordinates nor a place could be derived; the client
    /// should follow up with `POST /api/media/{id}/metadata`.
    pub manual_location_required: bool,
}

/// Upload a media file to a trip
///
/// Answers 200 when a location was derived and 202 when the owner still has to
/// set it manually.
#[utoipa::path(
    post,
    path = "/api/media/trip/{trip_id}",
    tag = "media",
    params(
        ("trip_id" = i64, Path, description = "Trip the media belongs to")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "Fields: `media` (file, alias `file`), optional `visibility` (PUBLIC, PRIVATE, FRIENDS)"),
    responses(
        (status = 200, description = "Media uploaded", body = UploadResponse),
        (status = 202, description = "Media uploaded, manual location required", body = UploadResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid session", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage or persistence failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, requester, multipart),
    fields(user_id = requester.user_id, operation = "upload_media")
)]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    requester: RequesterContext,
    ValidatedPath(trip_id): ValidatedPath<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let form = extract_upload_form(multipart?).await?;

    let outcome = state
        .media
        .upload(
            requester.user_id,
            UploadRequest {
                trip_id,
                filename: form.filename,
                content_type: form.content_type,
                data: form.data,
                visibility: form.visibility,
            },
        )
        .await?;

    let status = if outcome.manual_location_required {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };

    let body = UploadResponse {
        media_id: outcome.asset.id,
        storage_key: outcome.asset.storage_key,
        visibility: outcome.asset.visibility,
        metadata: outcome.metadata,
        manual_location_required: outcome.manual_location_required,
    };

    Ok((status, Json(body)).into_response())
}
