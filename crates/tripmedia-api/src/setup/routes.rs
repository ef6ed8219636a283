//! Route configuration and setup

use crate::api_doc::ApiDoc;
use crate::auth::{auth_middleware, AuthState};
use crate::error::json_payload_too_large;
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Build the application router
pub fn setup_routes(state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(&state.http.cors_origins)?;
    let auth_state = AuthState {
        identity: state.identity.clone(),
    };

    let protected_routes = protected_routes().layer(axum::middleware::from_fn_with_state(
        Arc::new(auth_state),
        auth_middleware,
    ));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1_000)
        .max(1);
    tracing::info!(http_concurrency_limit, "HTTP concurrency limit layer enabled");

    let app = public_routes()
        .merge(protected_routes)
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        // The multipart extractor's own 2 MB cap is replaced by the layer below
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.http.max_body_bytes))
        .layer(axum::middleware::map_response(json_payload_too_large))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn setup_cors(origins: &[String]) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    let cors = if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = origins
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        // Credentials so browsers send the auth_token cookie
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
            ])
            .allow_credentials(true)
    };
    Ok(cors)
}

/// Routes that do not require a session
fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}

/// Routes behind the auth middleware
fn protected_routes() -> Router<Arc<AppState>> {
    use handlers::{media_delete, media_get, media_metadata, media_upload, media_visibility};

    Router::new()
        .route(
            "/api/media/trip/{trip_id}",
            post(media_upload::upload_media).get(media_get::list_trip_media),
        )
        .route(
            "/api/media/{media_id}",
            get(media_get::get_media_url).delete(media_delete::delete_media),
        )
        .route(
            "/api/media/{media_id}/metadata",
            post(media_metadata::amend_media_metadata),
        )
        .route(
            "/api/media/{media_id}/visibility",
            get(media_visibility::get_media_visibility)
                .put(media_visibility::change_media_visibility),
        )
        .route(
            "/api/media/{media_id}/location",
            get(media_get::get_media_location),
        )
}
