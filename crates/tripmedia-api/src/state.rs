//! Application state shared by every handler.

use std::sync::Arc;
use tripmedia_services::{IdentityResolver, ReconciliationService};

use crate::services::media_lifecycle::MediaLifecycleService;

/// HTTP-level limits and CORS settings, read once at startup
#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub cors_origins: Vec<String>,
    /// Largest accepted request body. Slightly above the file limit so the
    /// multipart framing around a maximum-size file still fits.
    pub max_body_bytes: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub media: Arc<MediaLifecycleService>,
    pub identity: Arc<dyn IdentityResolver>,
    /// Absent when the background sweep is disabled
    pub reconciliation: Option<Arc<ReconciliationService>>,
    pub http: HttpConfig,
}
