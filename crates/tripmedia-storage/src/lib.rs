//! TripMedia Storage Library
//!
//! Blob storage abstraction with S3 (or any S3-compatible endpoint) and local
//! filesystem backends.
//!
//! # Storage key format
//!
//! All backends share one flat layout: `media/{millis}_{uuid}_{filename}`, with the
//! filename sanitized to a single path segment. Keys must not contain `..` or a
//! leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{generate_storage_key, MEDIA_PREFIX};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
pub use tripmedia_core::StorageBackend;
