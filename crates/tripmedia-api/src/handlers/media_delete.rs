use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::RequesterContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedPath};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub media_id: i64,
    pub deleted: bool,
}

/// Delete the file and then the record of a media
#[utoipa::path(
    delete,
    path = "/api/media/{media_id}",
    tag = "media",
    params(
        ("media_id" = i64, Path, description = "Media ID")
    ),
    responses(
        (status = 200, description = "Media deleted", body = DeleteResponse),
        (status = 403, description = "Requester is not the owner", body = ErrorResponse),
        (status = 404, description = "Media not found", body = ErrorResponse),
        (status = 500, description = "File or record deletion failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, requester),
    fields(user_id = requester.user_id, operation = "delete_media")
)]
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    requester: RequesterContext,
    ValidatedPath(media_id): ValidatedPath<i64>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    state
        .media
        .delete_completely(media_id, requester.user_id)
        .await?;
    Ok(Json(DeleteResponse {
        media_id,
        deleted: true,
    }))
}
