//! Storage abstraction trait
//!
//! This module defines the Storage trait that all blob backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One blob as reported by a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

/// Blob storage capability
///
/// A single bucket (or directory) holds all media. Keys come from
/// [`crate::keys::generate_storage_key`] and are never rewritten once stored.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `storage_key`
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Delete a blob. Deleting a missing blob is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Time-limited read URL for one blob
    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// All blobs whose key starts with `prefix`
    async fn list(&self, prefix: &str) -> StorageResult<Vec<StoredObject>>;

    fn backend_type(&self) -> StorageBackend;
}
