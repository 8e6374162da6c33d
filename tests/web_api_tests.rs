//! Integration tests for the Campus View Web API.
//!
//! These tests require the `web` feature to be enabled:
//! ```bash
//! cargo test --features web web_api
//! ```

#![cfg(feature = "web")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use campus_view::constants::DEFAULT_TICKER_LINES;
use campus_view::models::ContactSubmission;
use campus_view::services::{
    encode_data_url, ContentEditorSession, FormSink, PersistentStore, UploadPolicy,
};
use campus_view::web::{create_router, AppState};

mod fixtures;
use fixtures::*;

/// Form sink that keeps submissions in memory.
#[derive(Default)]
struct CollectingForms {
    received: Mutex<Vec<ContactSubmission>>,
    refuse: bool,
}

impl FormSink for CollectingForms {
    fn submit(&self, form: &ContactSubmission) -> Result<(), String> {
        if self.refuse {
            return Err("form endpoint returned 500".to_string());
        }
        self.received.lock().unwrap().push(form.clone());
        Ok(())
    }
}

struct TestServer {
    state: AppState,
    forms: Arc<CollectingForms>,
    _temp_dir: TempDir,
}

/// Creates a test AppState over a temporary storage directory.
fn create_test_server() -> TestServer {
    create_test_server_with(UploadPolicy::default(), CollectingForms::default())
}

fn create_test_server_with(uploads: UploadPolicy, forms: CollectingForms) -> TestServer {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let session = ContentEditorSession::mount(
        PersistentStore::in_dir(temp_dir.path().join("storage"), 0),
        uploads,
        Duration::from_secs(2),
    );
    let forms = Arc::new(forms);
    let state = AppState::with_parts(config, session, forms.clone());

    TestServer {
        state,
        forms,
        _temp_dir: temp_dir,
    }
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ============================================================================
// Health and content
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let (status, body) = send(&server.state, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_get_content_defaults() {
    let server = create_test_server();
    let (status, body) = send(&server.state, get("/api/content")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tickerLines"], json!(DEFAULT_TICKER_LINES));
    assert_eq!(body["bannerImages"].as_array().unwrap().len(), 2);
    assert_eq!(body["state"], "clean");
    assert!(body.get("lastSaved").is_none());
}

#[tokio::test]
async fn test_put_ticker_saves() {
    let server = create_test_server();
    let update = json!({ "tickerLines": ["Exams start Monday", "Bus routes updated"] });

    let (status, body) = send(&server.state, json_request("PUT", "/api/ticker", &update)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["savedAt"].is_string());

    let (_, content) = send(&server.state, get("/api/content")).await;
    assert_eq!(content["tickerLines"], update["tickerLines"]);
    assert!(content["lastSaved"].is_string());
}

#[tokio::test]
async fn test_put_banners_accepts_urls_and_inline_images() {
    let server = create_test_server();
    let inline = encode_data_url("image/png", &png_bytes(32));
    let update = json!({ "bannerImages": ["/images/open-day.png", inline] });

    let (status, _) = send(&server.state, json_request("PUT", "/api/banners", &update)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, content) = send(&server.state, get("/api/content")).await;
    assert_eq!(content["bannerImages"], update["bannerImages"]);
}

#[tokio::test]
async fn test_put_banners_rejects_oversized_inline_image() {
    let server = create_test_server_with(UploadPolicy::new(16), CollectingForms::default());
    let update = json!({ "bannerImages": [encode_data_url("image/png", &png_bytes(17))] });

    let (status, body) = send(&server.state, json_request("PUT", "/api/banners", &update)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].as_str().unwrap().contains("maximum limit"));

    let (_, content) = send(&server.state, get("/api/content")).await;
    assert_eq!(content["bannerImages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_put_banners_rejects_non_image_inline_data() {
    let server = create_test_server();
    let update = json!({ "bannerImages": [encode_data_url("text/html", b"<p>hi</p>")] });

    let (status, _) = send(&server.state, json_request("PUT", "/api/banners", &update)).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_reset_requires_confirmation() {
    let server = create_test_server();
    let update = json!({ "tickerLines": ["Temporary"] });
    send(&server.state, json_request("PUT", "/api/ticker", &update)).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/content")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&server.state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/content?confirm=true")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&server.state, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tickerLines"], json!(DEFAULT_TICKER_LINES));
}

// ============================================================================
// Contact form
// ============================================================================

#[tokio::test]
async fn test_contact_submission_delivered() {
    let server = create_test_server();
    let form = json!({
        "name": "Asha",
        "phone": "",
        "email": "asha@example.com",
        "message": "When do admissions close?"
    });

    let (status, _) = send(&server.state, json_request("POST", "/api/contact", &form)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let received = server.forms.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].email, "asha@example.com");
}

#[tokio::test]
async fn test_contact_missing_fields() {
    let server = create_test_server();
    let form = json!({ "name": "  ", "message": "Hello" });

    let (status, body) = send(&server.state, json_request("POST", "/api/contact", &form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], "Name is required; Email is required");
    assert!(server.forms.received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_contact_delivery_failure() {
    let server = create_test_server_with(
        UploadPolicy::default(),
        CollectingForms {
            refuse: true,
            ..CollectingForms::default()
        },
    );
    let form = json!({ "name": "Ravi", "email": "ravi@example.com", "message": "Hi" });

    let (status, body) = send(&server.state, json_request("POST", "/api/contact", &form)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().starts_with("Failed to send message"));
}

// ============================================================================
// Theme
// ============================================================================

#[tokio::test]
async fn test_theme_endpoint() {
    let server = create_test_server();

    let (status, body) = send(&server.state, get("/api/theme")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], "dark");

    let (_, body) = send(&server.state, get("/api/theme?visible=about-us,gallery")).await;
    assert_eq!(body["theme"], "light");
    assert_eq!(body["visible"], json!(["about-us", "gallery"]));

    let (_, body) = send(&server.state, get("/api/theme?visible=about-us,testimonials")).await;
    assert_eq!(body["theme"], "dark");

    let (status, _) = send(&server.state, get("/api/theme?visible=library")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
