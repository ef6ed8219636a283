//! Shared key generation for storage backends.
//!
//! Key format: `media/{millis}_{uuid}_{filename}`. The millisecond timestamp keeps
//! listings roughly in upload order; the v4 UUID makes keys unique across replicas.

use chrono::Utc;
use uuid::Uuid;

/// Prefix under which all media blobs live
pub const MEDIA_PREFIX: &str = "media/";

/// Reduce a client-supplied filename to a safe single path segment.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let mut cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }

    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Generate a fresh storage key for an uploaded file.
pub fn generate_storage_key(filename: &str) -> String {
    format!(
        "{}{}_{}_{}",
        MEDIA_PREFIX,
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        sanitize_filename(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let keys: HashSet<String> = (0..1000)
            .map(|_| generate_storage_key("IMG_0001.jpg"))
            .collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn test_key_keeps_original_filename() {
        let key = generate_storage_key("beach.png");
        assert!(key.starts_with(MEDIA_PREFIX));
        assert!(key.ends_with("_beach.png"));
    }

    #[test]
    fn test_key_carries_timestamp_and_uuid() {
        let key = generate_storage_key("IMG_0001.jpg");
        let rest = key.strip_prefix(MEDIA_PREFIX).unwrap();
        let mut parts = rest.splitn(3, '_');

        let millis: i64 = parts.next().unwrap().parse().unwrap();
        assert!(millis > 0);
        let nonce = parts.next().unwrap();
        assert_eq!(nonce.len(), 32);
        assert!(Uuid::parse_str(nonce).is_ok());
        assert_eq!(parts.next(), Some("IMG_0001.jpg"));
    }

    #[test]
    fn test_same_filename_same_instant_differs() {
        let a = generate_storage_key("IMG_0001.jpg");
        let b = generate_storage_key("IMG_0001.jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn test_sanitize_strips_directories_and_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\me.jpg"), "me.jpg");
        assert_eq!(sanitize_filename("a..b.jpg"), "a.b.jpg");
        assert_eq!(sanitize_filename("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_filename(""), "upload");
        assert_eq!(sanitize_filename(".."), "upload");
    }
}
