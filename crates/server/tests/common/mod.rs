//! Common test utilities for E2E testing with mocks.
//!
//! Provides a test fixture that builds an in-process server with an
//! in-memory store, a mock download daemon, and a real filesystem library
//! rooted in a temp directory.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use reardiff_core::testing::MockDownloadClient;
use reardiff_core::{
    Config, DatabaseConfig, DownloadClient, FsLibrary, Library, LibraryConfig, RecordStore,
    ServerConfig, SqliteRecordStore, TransmissionConfig,
};
use reardiff_server::api::create_router;
use reardiff_server::state::AppState;

/// Re-export record builders for test convenience
pub use reardiff_core::testing::fixtures;

/// Test fixture for E2E testing.
///
/// The library gateway is a real `FsLibrary` whose stored prefix
/// `/data/media` maps onto a temp directory, so tests exercise actual
/// file deletion.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The backing store, for seeding and assertions
    pub store: Arc<SqliteRecordStore>,
    /// Mock download daemon - seed torrents, force failures
    pub downloader: Arc<MockDownloadClient>,
    /// Temporary directory backing the library mount
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let store = Arc::new(SqliteRecordStore::in_memory().expect("Failed to create store"));
        let downloader = Arc::new(MockDownloadClient::new());

        let library_config = LibraryConfig {
            file_deletion_enabled: true,
            stored_path_prefix: "/data/media".to_string(),
            mount_path: temp_dir.path().to_path_buf(),
        };
        let library = Arc::new(FsLibrary::new(library_config.clone()));

        let config = Config {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                path: temp_dir.path().join("test.db"),
            },
            transmission: Some(TransmissionConfig {
                url: "http://localhost:9091".to_string(),
                username: "admin".to_string(),
                password: "hunter2".to_string(),
                timeout_secs: 15,
            }),
            library: library_config,
        };

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&store) as Arc<dyn RecordStore>,
            Arc::clone(&downloader) as Arc<dyn DownloadClient>,
            library as Arc<dyn Library>,
        ));

        let router = create_router(state);

        Self {
            router,
            store,
            downloader,
            temp_dir,
        }
    }

    /// Absolute mount path for a path stored under `/data/media`.
    pub fn mount_path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a PATCH request with JSON body.
    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(body)).await
    }

    /// Send a PATCH request without a body.
    pub async fn patch_empty(&self, path: &str) -> TestResponse {
        self.request("PATCH", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
