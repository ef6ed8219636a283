//! Session authentication
//!
//! Every `/api` route sits behind [`middleware::auth_middleware`], which turns the
//! caller's session token into a [`models::RequesterContext`].

pub mod middleware;
pub mod models;

pub use middleware::{auth_middleware, AuthState};
pub use models::RequesterContext;
