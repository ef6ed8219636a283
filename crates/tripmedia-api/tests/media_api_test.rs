//! Media API integration tests over in-memory stores.
//!
//! Run with: `cargo test -p tripmedia-api --test media_api_test`

mod helpers;

use helpers::*;
use serde_json::{json, Value};
use tripmedia_processing::fixtures::madrid_jpeg;

#[tokio::test]
async fn test_health_needs_no_session() {
    let app = setup_test_app();
    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_openapi_is_served() {
    let app = setup_test_app();
    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    assert!(response.json::<Value>()["paths"]["/api/media/{media_id}"].is_object());
}

#[tokio::test]
async fn test_missing_session_is_401() {
    let app = setup_test_app();
    let response = app.client().get("/api/media/1").await;
    assert_eq!(response.status_code(), 401);
    assert_eq!(response.json::<Value>()["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_rejected_and_zero_user_sessions_are_401() {
    let app = setup_test_app();
    for token in ["unknown-session", ANONYMOUS_TOKEN] {
        let response = app
            .client()
            .get("/api/media/trip/5")
            .add_header("Authorization", bearer(token))
            .await;
        assert_eq!(response.status_code(), 401, "token {}", token);
    }
}

#[tokio::test]
async fn test_zero_user_session_cannot_upload() {
    let app = setup_test_app();
    let response = app
        .client()
        .post(&format!("/api/media/trip/{}", TRIP_ID))
        .add_header("Authorization", bearer(ANONYMOUS_TOKEN))
        .multipart(upload_form("beach.png", "image/png", plain_png(), None))
        .await;

    assert_eq!(response.status_code(), 401);
    assert_eq!(response.json::<Value>()["code"], "UNAUTHORIZED");
    assert!(app.media.is_empty());
    assert_eq!(app.storage.file_count(), 0);
}

#[tokio::test]
async fn test_malformed_ids_are_json_400() {
    let app = setup_test_app();
    for path in [
        "/api/media/abc",
        "/api/media/abc/visibility",
        "/api/media/abc/location",
        "/api/media/trip/abc",
    ] {
        let response = app
            .client()
            .get(path)
            .add_header("Authorization", bearer(OWNER_TOKEN))
            .await;
        assert_eq!(response.status_code(), 400, "path {}", path);
        let body = response.json::<Value>();
        assert_eq!(body["code"], "INVALID_INPUT", "path {}", path);
    }
}

#[tokio::test]
async fn test_body_over_limit_is_json_413() {
    let app = setup_test_app();
    let oversized = vec![0u8; MAX_FILE_SIZE + 128 * 1024];
    let response = app
        .client()
        .post(&format!("/api/media/trip/{}", TRIP_ID))
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .multipart(upload_form("huge.png", "image/png", oversized, None))
        .await;

    assert_eq!(response.status_code(), 413);
    assert_eq!(response.json::<Value>()["code"], "PAYLOAD_TOO_LARGE");
    assert!(app.media.is_empty());
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let app = setup_test_app();
    let response = app
        .client()
        .get("/api/media/trip/5")
        .add_header("Cookie", format!("auth_token={}", OWNER_TOKEN))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!([]));
}

// Scenario A
#[tokio::test]
async fn test_upload_geotagged_jpeg() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/media/trip/5")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .multipart(upload_form("IMG_0001.jpg", "image/jpeg", madrid_jpeg(), None))
        .await;

    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["manual_location_required"], false);
    assert_eq!(body["visibility"], "PUBLIC");
    assert_eq!(body["metadata"]["kind"], "photo");
    assert!((body["metadata"]["latitude"].as_f64().unwrap() - 40.4168).abs() < 1e-6);
    assert!((body["metadata"]["longitude"].as_f64().unwrap() + 3.7038).abs() < 1e-6);
    assert!(body["metadata"]["place_id"].as_i64().unwrap() > 0);
    assert_eq!(body["metadata"]["city"], "Madrid");
    assert!(body["metadata"]["captured_at"]
        .as_str()
        .unwrap()
        .starts_with("2023-07-14"));
    assert!(body["storage_key"].as_str().unwrap().starts_with("media/"));
    assert_eq!(app.storage.file_count(), 1);
    assert_eq!(app.places.len(), 1);
}

// Scenario B
#[tokio::test]
async fn test_upload_png_without_tags_needs_manual_location() {
    let app = setup_test_app();
    let before = chrono::Utc::now();
    let response = app
        .client()
        .post("/api/media/trip/5")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .multipart(upload_form("pic.png", "image/png", plain_png(), Some("private")))
        .await;

    assert_eq!(response.status_code(), 202);
    let body = response.json::<Value>();
    assert_eq!(body["manual_location_required"], true);
    assert_eq!(body["visibility"], "PRIVATE");
    assert_eq!(body["metadata"]["kind"], "photo");
    assert_eq!(body["metadata"]["latitude"], 0.0);
    assert_eq!(body["metadata"]["longitude"], 0.0);
    let captured: chrono::DateTime<chrono::Utc> = body["metadata"]["captured_at"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(captured >= before - chrono::Duration::seconds(1));
    assert_eq!(app.geocoder.calls(), 0);
}

#[tokio::test]
async fn test_upload_rejects_unknown_visibility() {
    let app = setup_test_app();
    let response = app
        .client()
        .post("/api/media/trip/5")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .multipart(upload_form("pic.png", "image/png", plain_png(), Some("everyone")))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.storage.file_count(), 0);
}

#[tokio::test]
async fn test_upload_blob_store_down_is_500() {
    let app = setup_test_app();
    app.storage.fail_puts(true);
    let response = app
        .client()
        .post("/api/media/trip/5")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .multipart(upload_form("pic.png", "image/png", plain_png(), None))
        .await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(response.json::<Value>()["code"], "BLOB_STORE_UNAVAILABLE");
    assert!(app.media.is_empty());
}

// Scenario C
#[tokio::test]
async fn test_private_media_is_hidden_from_strangers() {
    let app = setup_test_app();
    let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), Some("PRIVATE")).await;

    let response = app
        .client()
        .get(&format!("/api/media/{}", id))
        .add_header("Authorization", bearer(STRANGER_TOKEN))
        .await;
    assert_eq!(response.status_code(), 403);
    assert_eq!(response.json::<Value>()["code"], "NOT_AUTHORIZED");
}

// Scenario D
#[tokio::test]
async fn test_friend_reads_friends_media() {
    let app = setup_test_app();
    let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), Some("FRIENDS")).await;

    let response = app
        .client()
        .get(&format!("/api/media/{}", id))
        .add_header("Authorization", bearer(FRIEND_TOKEN))
        .await;
    assert_eq!(response.status_code(), 200);
    let url = response.json::<Value>()["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("https://blobs.example.com/media/"));
    assert!(url.ends_with("expires=300"));

    let response = app
        .client()
        .get(&format!("/api/media/{}", id))
        .add_header("Authorization", bearer(STRANGER_TOKEN))
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_owner_reads_every_tier() {
    let app = setup_test_app();
    for tier in ["PUBLIC", "PRIVATE", "FRIENDS"] {
        let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), Some(tier)).await;
        let response = app
            .client()
            .get(&format!("/api/media/{}", id))
            .add_header("Authorization", bearer(OWNER_TOKEN))
            .await;
        assert_eq!(response.status_code(), 200, "tier {}", tier);
    }
}

#[tokio::test]
async fn test_missing_media_is_404() {
    let app = setup_test_app();
    let response = app
        .client()
        .get("/api/media/9999")
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .await;
    assert_eq!(response.status_code(), 404);
}

// Scenario E
#[tokio::test]
async fn test_delete_by_non_owner_is_403() {
    let app = setup_test_app();
    let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), None).await;

    let response = app
        .client()
        .delete(&format!("/api/media/{}", id))
        .add_header("Authorization", bearer(FRIEND_TOKEN))
        .await;
    assert_eq!(response.status_code(), 403);
    assert_eq!(app.storage.file_count(), 1);
    assert!(app.media.contains(id));
}

// Scenario F
#[tokio::test]
async fn test_record_delete_failure_after_blob_delete() {
    let app = setup_test_app();
    let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), None).await;
    app.media.fail_deletes(true);

    let response = app
        .client()
        .delete(&format!("/api/media/{}", id))
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .await;
    assert_eq!(response.status_code(), 500);
    assert_eq!(response.json::<Value>()["code"], "PERSISTENCE_FAILED");
    assert!(app.media.contains(id));
    assert_eq!(app.storage.file_count(), 0);
}

#[tokio::test]
async fn test_delete_by_owner() {
    let app = setup_test_app();
    let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), None).await;

    let response = app
        .client()
        .delete(&format!("/api/media/{}", id))
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!({ "media_id": id, "deleted": true }));
    assert!(app.media.is_empty());
    assert_eq!(app.storage.file_count(), 0);

    let response = app
        .client()
        .get(&format!("/api/media/{}", id))
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_change_visibility_is_idempotent() {
    let app = setup_test_app();
    let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), None).await;
    let path = format!("/api/media/{}/visibility", id);

    for _ in 0..2 {
        let response = app
            .client()
            .put(&path)
            .add_header("Authorization", bearer(OWNER_TOKEN))
            .json(&json!({ "visibility": "friends" }))
            .await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(
            response.json::<Value>(),
            json!({ "media_id": id, "visibility": "FRIENDS" })
        );
    }

    let response = app
        .client()
        .get(&path)
        .add_header("Authorization", bearer(FRIEND_TOKEN))
        .await;
    assert_eq!(response.json::<Value>()["visibility"], "FRIENDS");

    let response = app
        .client()
        .get(&path)
        .add_header("Authorization", bearer(STRANGER_TOKEN))
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_change_visibility_validation_and_ownership() {
    let app = setup_test_app();
    let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), None).await;
    let path = format!("/api/media/{}/visibility", id);

    let response = app
        .client()
        .put(&path)
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "visibility": "secret" }))
        .await;
    assert_eq!(response.status_code(), 400);

    let response = app
        .client()
        .put(&path)
        .add_header("Authorization", bearer(STRANGER_TOKEN))
        .json(&json!({ "visibility": "PRIVATE" }))
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_amend_metadata_resolves_place() {
    let app = setup_test_app();
    let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), None).await;
    let path = format!("/api/media/{}/metadata", id);

    let response = app
        .client()
        .get(&format!("/api/media/{}/location", id))
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .await;
    assert_eq!(response.status_code(), 404);

    let response = app
        .client()
        .post(&path)
        .add_header("Authorization", bearer(STRANGER_TOKEN))
        .json(&json!({ "latitude": 40.4168, "longitude": -3.7038 }))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = app
        .client()
        .post(&path)
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "latitude": 40.4168, "longitude": -3.7038, "altitude": 650.0 }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["location_resolved"], true);
    assert_eq!(body["altitude"], 650.0);
    assert_eq!(body["place"]["city"], "Madrid");

    let response = app
        .client()
        .get(&format!("/api/media/{}/location", id))
        .add_header("Authorization", bearer(FRIEND_TOKEN))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["country"], "Spain");
}

#[tokio::test]
async fn test_amend_metadata_with_geocoder_down_keeps_coordinates() {
    let app = setup_test_app();
    let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), None).await;
    app.geocoder.fail(true);

    let response = app
        .client()
        .post(&format!("/api/media/{}/metadata", id))
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "latitude": 48.8566, "longitude": 2.3522 }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body = response.json::<Value>();
    assert_eq!(body["location_resolved"], false);
    assert_eq!(body["latitude"], 48.8566);
    assert!(body["place"].is_null());
}

#[tokio::test]
async fn test_amend_metadata_rejects_malformed_body() {
    let app = setup_test_app();
    let id = upload(&app, OWNER_TOKEN, "pic.png", "image/png", plain_png(), None).await;

    let response = app
        .client()
        .post(&format!("/api/media/{}/metadata", id))
        .add_header("Authorization", bearer(OWNER_TOKEN))
        .json(&json!({ "latitude": "north" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_list_by_trip_filters_by_visibility() {
    let app = setup_test_app();
    let public = upload(&app, OWNER_TOKEN, "a.png", "image/png", plain_png(), Some("PUBLIC")).await;
    let private = upload(&app, OWNER_TOKEN, "b.png", "image/png", plain_png(), Some("PRIVATE")).await;
    let friends = upload(&app, OWNER_TOKEN, "c.png", "image/png", plain_png(), Some("FRIENDS")).await;

    let ids_for = |token: &'static str| {
        let client = app.client();
        async move {
            client
                .get("/api/media/trip/5")
                .add_header("Authorization", bearer(token))
                .await
                .json::<Vec<Value>>()
                .iter()
                .map(|item| item["media_id"].as_i64().unwrap())
                .collect::<Vec<_>>()
        }
    };

    assert_eq!(ids_for(OWNER_TOKEN).await, vec![public, private, friends]);
    assert_eq!(ids_for(FRIEND_TOKEN).await, vec![public, friends]);
    assert_eq!(ids_for(STRANGER_TOKEN).await, vec![public]);
}
