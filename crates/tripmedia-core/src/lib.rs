//! TripMedia Core Library
//!
//! Domain models, error types and configuration shared by every TripMedia crate.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, MediaServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
// Storage, StorageError, StorageResult live in tripmedia-storage
