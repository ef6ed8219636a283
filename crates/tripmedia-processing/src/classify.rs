//! Media kind classification
//!
//! A file is a photo or a video when EITHER its extension OR its sniffed content
//! type says so. The declared content type from the client is never trusted for
//! classification.

use std::path::Path;
use tripmedia_core::models::MediaKind;

pub const PHOTO_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "tiff"];
pub const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "avi", "mkv", "webm", "flv"];

/// Lower-cased extension of `filename`, if any
fn extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Sniff the content type from leading magic bytes.
pub fn detect_content_type(data: &[u8]) -> Option<&'static str> {
    detect_image(data).or_else(|| detect_video(data))
}

#[cfg(feature = "image")]
fn detect_image(data: &[u8]) -> Option<&'static str> {
    image::guess_format(data).ok().map(|f| f.to_mime_type())
}

#[cfg(not(feature = "image"))]
fn detect_image(_data: &[u8]) -> Option<&'static str> {
    None
}

fn detect_video(data: &[u8]) -> Option<&'static str> {
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return Some(if &data[8..12] == b"qt  " {
            "video/quicktime"
        } else {
            "video/mp4"
        });
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"AVI " {
        return Some("video/x-msvideo");
    }
    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        // EBML header; the doctype string sits within the first few dozen bytes
        let head = &data[..data.len().min(64)];
        return Some(if head.windows(4).any(|w| w == b"webm") {
            "video/webm"
        } else {
            "video/x-matroska"
        });
    }
    if data.starts_with(b"FLV\x01") {
        return Some("video/x-flv");
    }
    None
}

/// Classify an upload by filename extension and sniffed bytes.
pub fn classify(filename: &str, data: &[u8]) -> MediaKind {
    let ext = extension(filename);
    let ext = ext.as_deref().unwrap_or_default();
    let sniffed = detect_content_type(data).unwrap_or_default();

    if PHOTO_EXTENSIONS.contains(&ext) || sniffed.starts_with("image/") {
        MediaKind::Photo
    } else if VIDEO_EXTENSIONS.contains(&ext) || sniffed.starts_with("video/") {
        MediaKind::Video
    } else {
        MediaKind::Unknown
    }
}
