//! Session token to user id, via the auth service

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tripmedia_core::AppError;

/// Name of the session cookie issued by the auth service
pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Missing session token")]
    MissingToken,

    #[error("Auth service rejected the token with status {0}")]
    Rejected(u16),

    #[error("Auth service unreachable: {0}")]
    Unreachable(String),

    #[error("Malformed auth service response: {0}")]
    Malformed(String),

    #[error("Session does not belong to a user")]
    InvalidUser,
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        AppError::Unauthorized(err.to_string())
    }
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve a session token to a non-zero user id
    async fn resolve(&self, token: &str) -> Result<i64, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    user: ProfileUser,
}

#[derive(Debug, Deserialize)]
struct ProfileUser {
    user_id: i64,
}

/// Client for the auth service `GET /profile` endpoint
#[derive(Clone)]
pub struct AuthServiceClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl AuthServiceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for the auth service")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl IdentityResolver for AuthServiceClient {
    #[tracing::instrument(skip(self, token))]
    async fn resolve(&self, token: &str) -> Result<i64, IdentityError> {
        if token.trim().is_empty() {
            return Err(IdentityError::MissingToken);
        }

        let response = self
            .http_client
            .get(format!("{}/profile", self.base_url))
            .header(reqwest::header::COOKIE, format!("{}={}", AUTH_COOKIE, token))
            .send()
            .await
            .map_err(|e| IdentityError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Rejected(status.as_u16()));
        }

        let profile: ProfileResponse = response
            .json()
            .await
            .map_err(|e| IdentityError::Malformed(e.to_string()))?;

        if profile.user.user_id == 0 {
            return Err(IdentityError::InvalidUser);
        }

        Ok(profile.user.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::ServerGuard) -> AuthServiceClient {
        AuthServiceClient::new(server.url(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn test_resolves_user_id_from_profile() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/profile")
            .match_header("cookie", "auth_token=good-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"user":{"user_id":42,"username":"ana"}}"#)
            .create_async()
            .await;

        assert_eq!(client(&server).resolve("good-token").await.unwrap(), 42);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/profile")
            .with_status(401)
            .create_async()
            .await;

        let err = client(&server).resolve("expired").await.unwrap_err();
        assert!(matches!(err, IdentityError::Rejected(401)));
        assert!(matches!(AppError::from(err), AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_zero_user_id_is_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/profile")
            .with_status(200)
            .with_body(r#"{"user":{"user_id":0}}"#)
            .create_async()
            .await;

        assert!(matches!(
            client(&server).resolve("anon").await,
            Err(IdentityError::InvalidUser)
        ));
    }

    #[tokio::test]
    async fn test_empty_token_skips_the_call() {
        let server = mockito::Server::new_async().await;
        assert!(matches!(
            client(&server).resolve("  ").await,
            Err(IdentityError::MissingToken)
        ));
    }

    #[tokio::test]
    async fn test_malformed_profile() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/profile")
            .with_status(200)
            .with_body(r#"{"profile":{}}"#)
            .create_async()
            .await;

        assert!(matches!(
            client(&server).resolve("token").await,
            Err(IdentityError::Malformed(_))
        ));
    }
}
