//! Test helpers: build the router over in-memory stores and fake collaborators.
//!
//! Run with: `cargo test -p tripmedia-api --test media_api_test`. No Docker or
//! network access is needed.

#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use tripmedia_api::services::media_lifecycle::{LifecycleSettings, MediaLifecycleService};
use tripmedia_api::setup::routes::setup_routes;
use tripmedia_api::state::{AppState, HttpConfig};
use tripmedia_core::models::PlaceName;
use tripmedia_db::test_helpers::{InMemoryFriendshipStore, InMemoryMediaStore, InMemoryPlaceStore};
use tripmedia_services::test_helpers::{FakeGeocoder, StaticIdentityResolver};
use tripmedia_services::{PlaceResolver, VisibilityPolicy};
use tripmedia_storage::test_helpers::MockStorage;

pub const OWNER_ID: i64 = 10;
pub const FRIEND_ID: i64 = 20;
pub const STRANGER_ID: i64 = 30;

pub const OWNER_TOKEN: &str = "owner-session";
pub const FRIEND_TOKEN: &str = "friend-session";
pub const STRANGER_TOKEN: &str = "stranger-session";
/// Resolves to user id 0
pub const ANONYMOUS_TOKEN: &str = "anonymous-session";

pub const TRIP_ID: i64 = 5;
pub const MAX_FILE_SIZE: usize = 1024 * 1024;

pub struct TestApp {
    pub server: TestServer,
    pub media: InMemoryMediaStore,
    pub places: InMemoryPlaceStore,
    pub storage: MockStorage,
    pub geocoder: FakeGeocoder,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn setup_test_app() -> TestApp {
    let media = InMemoryMediaStore::new();
    let places = InMemoryPlaceStore::new();
    let storage = MockStorage::new();
    let geocoder = FakeGeocoder::new();
    geocoder.set_default(PlaceName::new("Madrid", "Spain"));

    let friendships = InMemoryFriendshipStore::new();
    friendships.add(OWNER_ID, FRIEND_ID);

    let identity = StaticIdentityResolver::new()
        .with_user(OWNER_TOKEN, OWNER_ID)
        .with_user(FRIEND_TOKEN, FRIEND_ID)
        .with_user(STRANGER_TOKEN, STRANGER_ID)
        .with_user(ANONYMOUS_TOKEN, 0);

    let resolver = Arc::new(PlaceResolver::new(
        Arc::new(geocoder.clone()),
        Arc::new(places.clone()),
    ));
    let policy = VisibilityPolicy::new(Arc::new(friendships), Duration::from_secs(1));
    let lifecycle = MediaLifecycleService::new(
        Arc::new(media.clone()),
        Arc::new(storage.clone()),
        resolver,
        policy,
        LifecycleSettings {
            max_file_size: MAX_FILE_SIZE,
            presigned_url_ttl: Duration::from_secs(300),
            blob_timeout: Duration::from_secs(1),
        },
    );

    let state = Arc::new(AppState {
        media: Arc::new(lifecycle),
        identity: Arc::new(identity),
        reconciliation: None,
        http: HttpConfig {
            cors_origins: vec!["*".to_string()],
            max_body_bytes: MAX_FILE_SIZE + 64 * 1024,
        },
    });

    let router = setup_routes(state).expect("router");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        media,
        places,
        storage,
        geocoder,
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn upload_form(filename: &str, mime: &str, data: Vec<u8>, visibility: Option<&str>) -> MultipartForm {
    let form = MultipartForm::new().add_part(
        "media",
        Part::bytes(data).file_name(filename.to_string()).mime_type(mime.to_string()),
    );
    match visibility {
        Some(v) => form.add_text("visibility", v.to_string()),
        None => form,
    }
}

/// 1x1 transparent PNG without any metadata chunks
pub fn plain_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Upload as `token` and return the new media id
pub async fn upload(
    app: &TestApp,
    token: &str,
    filename: &str,
    mime: &str,
    data: Vec<u8>,
    visibility: Option<&str>,
) -> i64 {
    let response = app
        .client()
        .post(&format!("/api/media/trip/{}", TRIP_ID))
        .add_header("Authorization", bearer(token))
        .multipart(upload_form(filename, mime, data, visibility))
        .await;
    assert!(
        response.status_code() == 200 || response.status_code() == 202,
        "upload failed: {}",
        response.text()
    );
    response.json::<serde_json::Value>()["media_id"]
        .as_i64()
        .expect("media_id")
}
