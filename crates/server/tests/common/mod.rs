//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with a mock resolver and transcoder injected, so the full HTTP surface
//! can be exercised without yt-dlp or ffmpeg installed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tunegrab_core::{
    testing::{fixtures::harness, MockResolver, MockTranscoder},
    Config, ConversionService, ProgressStore, StagingArea,
};
use tunegrab_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use tunegrab_core::testing::fixtures;

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_convert() {
///     let fixture = TestFixture::new();
///     fixture.resolver.set_title("My Song!").await;
///
///     let response = fixture
///         .post("/api/convert", json!({ "youtubeUrl": "https://youtu.be/validid" }))
///         .await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock resolver - configure titles, payloads and failures
    pub resolver: Arc<MockResolver>,
    /// Mock transcoder - configure output, progress and failures
    pub transcoder: Arc<MockTranscoder>,
    /// Shared progress store
    pub progress: Arc<ProgressStore>,
    /// The service behind the router
    pub service: Arc<ConversionService>,
    /// Staging directory
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
    /// Body parsed as JSON, or `Null` when it is not JSON
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a test fixture with custom configuration.
    ///
    /// The staging section is replaced with a temporary directory.
    pub fn with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let h = harness(temp_dir.path());

        let state = Arc::new(AppState::new(config, Arc::clone(&h.service)));
        let router = create_router(state);

        Self {
            router,
            resolver: h.resolver,
            transcoder: h.transcoder,
            progress: h.progress,
            service: h.service,
            temp_dir,
        }
    }

    /// Staging area of the service.
    pub fn staging(&self) -> &StagingArea {
        self.service.pipeline().staging()
    }

    /// Number of files left in the staging directory.
    pub fn staged_files_on_disk(&self) -> usize {
        fixtures::dir_entries(self.temp_dir.path())
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, "application/json").await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let body = serde_json::to_string(&body).unwrap();
        self.request("POST", path, Some(body), "application/json")
            .await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        self.request("POST", path, Some(body.to_string()), "application/json")
            .await
    }

    /// Send a POST request with custom content type (for testing wrong content types).
    pub async fn post_with_content_type(
        &self,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        self.request("POST", path, Some(body.to_string()), content_type)
            .await
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
        content_type: &str,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = match body {
            Some(body) => {
                request_builder = request_builder.header("Content-Type", content_type);
                Body::from(body)
            }
            None => Body::empty(),
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}
