//! Error types module
//!
//! All failures of the media pipeline are unified under [`AppError`]. Each variant
//! describes how it is presented over HTTP through [`ErrorMetadata`], so handlers never
//! pick status codes by hand.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected errors like validation failures or denied reads
    Debug,
    /// Degraded but handled situations
    Warn,
    /// Unexpected failures of a backend
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "NOT_AUTHORIZED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    /// Missing or invalid session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Valid session, but the visibility policy or ownership rule denies the request.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Location lookup failed: {0}")]
    LocationLookupFailed(String),

    #[error("Blob store unavailable: {0}")]
    BlobStoreUnavailable(String),

    #[error("Storage delete failed: {0}")]
    StorageDeleteFailed(String),

    /// A database write failed. When `reconciliation_required` is set, a blob-store
    /// mutation already succeeded and the pair is now inconsistent.
    #[error("Persistence failed: {message}")]
    PersistenceFailed {
        message: String,
        reconciliation_required: bool,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and upload again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Sign in again to obtain a valid session token"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotAuthorized(_) => (
            403,
            "NOT_AUTHORIZED",
            false,
            Some("Ask the owner to change the media visibility"),
            false,
            LogLevel::Debug,
        ),
        AppError::LocationLookupFailed(_) => (
            502,
            "LOCATION_LOOKUP_FAILED",
            true,
            Some("Set the location manually or retry later"),
            false,
            LogLevel::Warn,
        ),
        AppError::BlobStoreUnavailable(_) => (
            500,
            "BLOB_STORE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::StorageDeleteFailed(_) => (
            500,
            "STORAGE_DELETE_FAILED",
            true,
            Some("Retry the delete after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::PersistenceFailed { .. } => (
            500,
            "PERSISTENCE_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::NotAuthorized(_) => "NotAuthorized",
            AppError::LocationLookupFailed(_) => "LocationLookupFailed",
            AppError::BlobStoreUnavailable(_) => "BlobStoreUnavailable",
            AppError::StorageDeleteFailed(_) => "StorageDeleteFailed",
            AppError::PersistenceFailed { .. } => "PersistenceFailed",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Wrap a database failure that happened after the blob store was already mutated.
    pub fn needs_reconciliation(message: impl Into<String>) -> Self {
        AppError::PersistenceFailed {
            message: message.into(),
            reconciliation_required: true,
        }
    }

    /// Whether the error left the blob store and the media table out of sync.
    pub fn requires_reconciliation(&self) -> bool {
        matches!(
            self,
            AppError::PersistenceFailed {
                reconciliation_required: true,
                ..
            }
        )
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::NotAuthorized(ref msg) => msg.clone(),
            AppError::LocationLookupFailed(_) => "Failed to resolve location".to_string(),
            AppError::BlobStoreUnavailable(_) => "Failed to access media storage".to_string(),
            AppError::StorageDeleteFailed(_) => "Failed to delete media file".to_string(),
            AppError::PersistenceFailed {
                reconciliation_required: true,
                ..
            } => "Media record could not be updated after its file changed; flagged for reconciliation"
                .to_string(),
            AppError::PersistenceFailed { .. } => "Failed to save media record".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}
