//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock attendance API and in-memory storage, enabling E2E testing
//! without network access.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use dayoff_core::{
    config::{AttendanceConfig, AuthConfig, ScannerConfig, ServerConfig, StorageConfig},
    testing::MockAttendanceApi,
    ApiKeyAuthenticator, AuthMethod, Authenticator, Config, MemoryKeyValueStore,
    NoneAuthenticator, Scanner, Settings, SettingsStore,
};
use dayoff_server::api::{create_router, WsBroadcaster};
use dayoff_server::state::AppState;

/// Re-export fixtures for test convenience
pub use dayoff_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_scan() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/scans", json!({
///         "text": fixtures::pass_url("ab12")
///     })).await;
///
///     assert_eq!(response.body["status"], "check_in_success");
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock attendance API - script responses, inspect calls
    pub api: Arc<MockAttendanceApi>,
    /// Settings store behind the scanner
    pub store: SettingsStore,
    /// Broadcaster wired into the scanner
    pub ws_broadcaster: WsBroadcaster,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Settings present on the device at startup
    pub settings: Settings,
    /// Gate key required by the API, if any
    pub api_key: Option<String>,
    /// Passcode required to re-provision the device
    pub import_passcode: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            settings: fixtures::provisioned_settings(dayoff_core::Direction::In),
            api_key: None,
            import_passcode: None,
        }
    }
}

impl TestConfig {
    /// A device that has never been provisioned.
    pub fn unprovisioned() -> Self {
        Self {
            settings: Settings::default(),
            ..Self::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let api = Arc::new(MockAttendanceApi::new());
        let store = SettingsStore::new(Arc::new(MemoryKeyValueStore::new()));
        store
            .persist(&test_config.settings)
            .expect("Failed to seed settings");

        let (auth, authenticator): (AuthConfig, Arc<dyn Authenticator>) =
            match test_config.api_key {
                Some(key) => (
                    AuthConfig {
                        method: AuthMethod::ApiKey,
                        api_key: Some(key.clone()),
                    },
                    Arc::new(ApiKeyAuthenticator::new(key)),
                ),
                None => (
                    AuthConfig {
                        method: AuthMethod::None,
                        api_key: None,
                    },
                    Arc::new(NoneAuthenticator::new()),
                ),
            };

        let config = Config {
            auth,
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            attendance: AttendanceConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                timeout_secs: 1,
            },
            scanner: ScannerConfig {
                import_passcode: test_config.import_passcode,
                ..ScannerConfig::default()
            },
            storage: StorageConfig::default(),
        };

        let ws_broadcaster = WsBroadcaster::default();
        let scanner = Arc::new(Scanner::new(
            &config.scanner,
            Arc::clone(&api) as Arc<dyn dayoff_core::AttendanceApi>,
            store.clone(),
            Arc::new(ws_broadcaster.clone()),
        ));

        let state = Arc::new(AppState::new(
            config,
            authenticator,
            scanner,
            ws_broadcaster.clone(),
        ));
        let router = create_router(state);

        Self {
            router,
            api,
            store,
            ws_broadcaster,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, &[]).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body), &[]).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        self.request("GET", path, None, headers).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            request_builder = request_builder.header(*name, *value);
        }

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
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
