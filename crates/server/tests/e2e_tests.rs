//! End-to-end tests with a mocked attendance API.
//!
//! These tests run the full HTTP stack in-process: router, auth middleware,
//! scanner, settings store and status board.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use dayoff_core::{
    testing::{MockAttendanceApi, RecordedCall},
    AttendanceError, Direction, ScreenStatus, Stats,
};

use common::{fixtures, TestConfig, TestFixture};

// =============================================================================
// Basic API Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_initial_status_is_initialized() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/status").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "initialized");
    assert_eq!(response.body["info"]["hide_scanning"], false);
    assert!(response.body["last_checkin"].is_null());
}

#[tokio::test]
async fn test_settings_never_expose_token() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/settings").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["token_configured"], true);
    assert_eq!(response.body["name"], "南门");
    assert_eq!(
        response.body["token_fingerprint"].as_str().map(str::len),
        Some(12)
    );
    assert!(!response.body.to_string().contains(fixtures::GATE_TOKEN));
}

// =============================================================================
// Scan Dispatch
// =============================================================================

#[tokio::test]
async fn test_ticket_scan_checks_in() {
    let fixture = TestFixture::new().await;
    fixture.api.set_request_id(Some("req-42")).await;

    let response = fixture
        .post(
            "/api/v1/scans",
            json!({ "text": fixtures::pass_url("ab12-34") }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["outcome"], "completed");
    assert_eq!(response.body["status"], "check_in_success");
    assert_eq!(response.body["info"]["title"], "入校成功");

    assert_eq!(
        fixture.api.calls().await,
        vec![RecordedCall::Checkin {
            ticket: "ab12-34".to_string(),
            direction: Direction::In,
            token: fixtures::GATE_TOKEN.to_string(),
        }]
    );

    let status = fixture.get("/api/v1/status").await;
    assert_eq!(status.body["status"], "check_in_success");
    assert_eq!(status.body["last_checkin"]["ticket"], "ab12-34");
    assert_eq!(status.body["last_checkin"]["request_id"], "req-42");

    let settings = fixture.get("/api/v1/settings").await;
    assert_eq!(settings.body["stats"]["success"], 1);
}

#[tokio::test]
async fn test_wrong_direction_is_reported() {
    let fixture = TestFixture::new().await;
    fixture
        .api
        .fail_next_checkin(MockAttendanceApi::rejection(40316))
        .await;

    let response = fixture
        .post("/api/v1/scans", json!({ "text": fixtures::pass_url("ab12") }))
        .await;

    assert_eq!(response.body["status"], "invalid_direction");
    assert_eq!(fixture.store.get().stats.fail, 1);
}

#[tokio::test]
async fn test_timeout_is_system_error() {
    let fixture = TestFixture::new().await;
    fixture.api.fail_next_checkin(AttendanceError::Timeout).await;

    let response = fixture
        .post("/api/v1/scans", json!({ "text": fixtures::pass_url("ab12") }))
        .await;

    assert_eq!(response.body["status"], "system_error");
    assert_eq!(fixture.store.get().stats.error, 1);
}

#[tokio::test]
async fn test_unrecognized_text_is_invalid_ticket() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/scans", json!({ "text": "hello world" }))
        .await;

    assert_eq!(response.body["status"], "invalid_ticket");
    assert!(fixture.api.calls().await.is_empty());
}

#[tokio::test]
async fn test_repeated_scan_is_ignored() {
    let fixture = TestFixture::new().await;
    let body = json!({ "text": fixtures::pass_url("ab12") });

    fixture.post("/api/v1/scans", body.clone()).await;
    let response = fixture.post("/api/v1/scans", body).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["outcome"], "ignored");
    assert_eq!(response.body["reason"], "duplicate");
    assert_eq!(fixture.api.checkin_count().await, 1);
}

#[tokio::test]
async fn test_empty_scan_is_rejected() {
    let fixture = TestFixture::new().await;
    let response = fixture.post("/api/v1/scans", json!({ "text": "  " })).await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_scan_body_is_rejected() {
    let fixture = TestFixture::new().await;
    let response = fixture.post_raw("/api/v1/scans", "{not json").await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_scan_failure_report() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/scans/failures", json!({ "reason": "camera busy" }))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "system_error");
    assert_eq!(fixture.store.get().stats.error, 1);
}

// =============================================================================
// Provisioning
// =============================================================================

#[tokio::test]
async fn test_fresh_device_accepts_settings_code() {
    let fixture = TestFixture::with_config(TestConfig::unprovisioned()).await;
    let text = fixtures::settings_json("tk-fresh", Direction::Out, "东门", None);

    let response = fixture.post("/api/v1/scans", json!({ "text": text })).await;

    assert_eq!(response.body["status"], "config_updated");
    let settings = fixture.get("/api/v1/settings").await;
    assert_eq!(settings.body["token_configured"], true);
    assert_eq!(settings.body["direction"], 1);
    assert_eq!(settings.body["name"], "东门");
}

#[tokio::test]
async fn test_provisioned_device_requires_passcode() {
    let fixture = TestFixture::with_config(TestConfig {
        import_passcode: Some("2468".to_string()),
        ..TestConfig::default()
    })
    .await;
    let text = fixtures::settings_json(
        "tk-new",
        Direction::Out,
        "东门",
        Some(Stats {
            success: 0,
            fail: 0,
            error: 0,
        }),
    );

    let denied = fixture
        .post("/api/v1/scans", json!({ "text": text }))
        .await;
    assert_eq!(denied.body["status"], "invalid_ticket");
    assert_eq!(fixture.store.get().token, fixtures::GATE_TOKEN);

    fixture
        .post("/api/v1/scans", json!({ "text": "break the repeat" }))
        .await;

    let approved = fixture
        .post("/api/v1/scans", json!({ "text": text, "passcode": "2468" }))
        .await;
    assert_eq!(approved.body["status"], "config_updated");

    let persisted = fixture.store.get();
    assert_eq!(persisted.token, "tk-new");
    assert_eq!(persisted.stats, Stats::default());
}

#[tokio::test]
async fn test_provisioned_device_without_passcode_configured_refuses_import() {
    let fixture = TestFixture::new().await;
    let text = fixtures::settings_json("tk-new", Direction::Out, "东门", None);

    let response = fixture
        .post("/api/v1/scans", json!({ "text": text, "passcode": "anything" }))
        .await;

    assert_eq!(response.body["status"], "invalid_ticket");
    assert_eq!(fixture.store.get().token, fixtures::GATE_TOKEN);
}

// =============================================================================
// Ticket Lookup
// =============================================================================

#[tokio::test]
async fn test_ticket_lookup() {
    let fixture = TestFixture::new().await;
    fixture
        .api
        .set_ticket_status(fixtures::ticket_status("ab12"))
        .await;

    let response = fixture.get("/api/v1/tickets/ab12").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["ticket_id"], "ab12");
    assert_eq!(response.body["last_direction"], "out");
    assert_eq!(response.body["staff_name"], "张三");
}

#[tokio::test]
async fn test_ticket_lookup_errors_map_to_http_status() {
    let fixture = TestFixture::new().await;

    let missing = fixture.get("/api/v1/tickets/unknown").await;
    assert_status!(missing, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["code"], 40306);

    fixture
        .api
        .fail_next_lookup(MockAttendanceApi::rejection(40101))
        .await;
    let unauthorized = fixture.get("/api/v1/tickets/ab12").await;
    assert_status!(unauthorized, StatusCode::UNAUTHORIZED);

    fixture
        .api
        .fail_next_lookup(AttendanceError::UnexpectedStatus {
            status: 500,
            body: "oops".to_string(),
        })
        .await;
    let upstream = fixture.get("/api/v1/tickets/ab12").await;
    assert_status!(upstream, StatusCode::BAD_GATEWAY);
    assert!(upstream.body["code"].is_null());
}

// =============================================================================
// Auth, Metrics, Broadcast
// =============================================================================

#[tokio::test]
async fn test_gate_key_protects_api_but_not_health() {
    let fixture = TestFixture::with_config(TestConfig {
        api_key: Some("gate-secret".to_string()),
        ..TestConfig::default()
    })
    .await;

    assert_status!(fixture.get("/api/v1/health").await, StatusCode::OK);
    assert_status!(fixture.get("/api/v1/status").await, StatusCode::UNAUTHORIZED);
    assert_status!(
        fixture
            .get_with_headers("/api/v1/status", &[("x-gate-key", "gate-secret")])
            .await,
        StatusCode::OK
    );

    let config = fixture
        .get_with_headers(
            "/api/v1/config",
            &[("authorization", "Bearer gate-secret")],
        )
        .await;
    assert_eq!(config.body["auth"]["method"], "api_key");
    assert!(!config.body.to_string().contains("gate-secret"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    fixture
        .post("/api/v1/scans", json!({ "text": fixtures::pass_url("ab12") }))
        .await;

    let (status, body) = fixture.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("dayoff_scans_total"));
    assert!(body.contains("dayoff_settings_stats"));
    assert!(body.contains("dayoff_display_status"));
}

#[tokio::test]
async fn test_status_changes_are_broadcast() {
    let fixture = TestFixture::new().await;
    let mut rx = fixture.ws_broadcaster.subscribe();

    fixture
        .post("/api/v1/scans", json!({ "text": fixtures::pass_url("ab12") }))
        .await;

    let mut statuses = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        let json = serde_json::to_value(&msg).unwrap();
        statuses.push(json["status"].as_str().unwrap_or_default().to_string());
    }
    assert_eq!(
        statuses,
        vec![
            ScreenStatus::Loading.as_str().to_string(),
            ScreenStatus::CheckInSuccess.as_str().to_string(),
        ]
    );
}
