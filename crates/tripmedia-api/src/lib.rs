//! TripMedia API Library
//!
//! HTTP handlers, authentication, the media lifecycle and application setup.

mod api_doc;
mod handlers;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use services::media_lifecycle::MediaLifecycleService;
