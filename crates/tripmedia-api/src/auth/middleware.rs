use crate::auth::models::RequesterContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tripmedia_core::AppError;
use tripmedia_services::{IdentityError, IdentityResolver, AUTH_COOKIE};

#[derive(Clone)]
pub struct AuthState {
    pub identity: Arc<dyn IdentityResolver>,
}

/// Session token from the `auth_token` cookie, falling back to `Authorization: Bearer`.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE)
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_session_token(request.headers()) else {
        return HttpAppError(AppError::from(IdentityError::MissingToken)).into_response();
    };

    let user_id = match auth_state.identity.resolve(&token).await {
        Ok(user_id) if user_id > 0 => user_id,
        Ok(user_id) => {
            tracing::debug!(user_id, "Session resolved to no user");
            return HttpAppError(AppError::from(IdentityError::InvalidUser)).into_response();
        }
        Err(e) => {
            tracing::debug!(error = %e, "Session token rejected");
            return HttpAppError(AppError::from(e)).into_response();
        }
    };

    request
        .extensions_mut()
        .insert(RequesterContext { user_id });

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use axum::{routing::get, Router};
    use axum_test::TestServer;

    /// Accepts every token and answers with a fixed id
    struct FixedResolver(i64);

    #[async_trait]
    impl IdentityResolver for FixedResolver {
        async fn resolve(&self, _token: &str) -> Result<i64, IdentityError> {
            Ok(self.0)
        }
    }

    fn server_with(user_id: i64) -> TestServer {
        let auth_state = Arc::new(AuthState {
            identity: Arc::new(FixedResolver(user_id)),
        });
        let router = Router::new()
            .route(
                "/whoami",
                get(|requester: RequesterContext| async move { requester.user_id.to_string() }),
            )
            .layer(axum::middleware::from_fn_with_state(auth_state, auth_middleware));
        TestServer::new(router).unwrap()
    }

    #[tokio::test]
    async fn test_non_positive_user_id_is_401() {
        for user_id in [0, -3] {
            let response = server_with(user_id)
                .get("/whoami")
                .add_header("Authorization", "Bearer any")
                .await;
            assert_eq!(response.status_code(), 401, "user_id {}", user_id);
        }
    }

    #[tokio::test]
    async fn test_resolved_user_reaches_handler() {
        let response = server_with(42)
            .get("/whoami")
            .add_header("Authorization", "Bearer any")
            .await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.text(), "42");
    }

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; auth_token=abc123; lang=es"),
        );
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("auth_token=from-cookie"));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer from-header"),
        );
        assert_eq!(
            extract_session_token(&headers).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn test_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_missing_or_blank_token() {
        assert!(extract_session_token(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("auth_token="));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert!(extract_session_token(&headers).is_none());
    }
}
