//! Multipart parsing for media uploads

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use bytes::Bytes;
use tripmedia_core::models::Visibility;
use tripmedia_core::AppError;

/// Field carrying the file. `file` is accepted as an alias.
pub const MEDIA_FIELD: &str = "media";
const MEDIA_FIELD_ALIAS: &str = "file";
const VISIBILITY_FIELD: &str = "visibility";

#[derive(Debug)]
pub struct UploadForm {
    pub data: Bytes,
    pub filename: String,
    /// Content type declared by the client, if any
    pub content_type: Option<String>,
    pub visibility: Visibility,
}

/// Read the file and the optional visibility from a multipart form.
/// Exactly one file field is accepted; unknown fields are ignored.
pub async fn extract_upload_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut file: Option<(Bytes, Option<String>, Option<String>)> = None;
    let mut visibility: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            MEDIA_FIELD | MEDIA_FIELD_ALIAS => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'media'"
                            .to_string(),
                    ));
                }
                let filename = field.file_name().map(|s| s.to_string());
                let content_type = field.content_type().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;
                file = Some((data, filename, content_type));
            }
            VISIBILITY_FIELD => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read visibility", e))?;
                visibility = Some(value);
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }

    let (data, filename, content_type) =
        file.ok_or_else(|| AppError::InvalidInput("No media file provided".to_string()))?;

    Ok(UploadForm {
        data,
        filename: filename.unwrap_or_else(|| "upload".to_string()),
        content_type: content_type.map(|ct| normalize_mime_type(&ct).to_string()),
        visibility: Visibility::from_optional(visibility.as_deref())?,
    })
}

/// A body cut off by the request limit surfaces here as a stream error.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, err.body_text()))
    } else {
        AppError::InvalidInput(format!("{}: {}", context, err.body_text()))
    }
}

/// Strip parameters ("image/jpeg; charset=binary" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mime_type() {
        assert_eq!(normalize_mime_type("image/jpeg; charset=binary"), "image/jpeg");
        assert_eq!(normalize_mime_type("video/mp4"), "video/mp4");
    }
}
