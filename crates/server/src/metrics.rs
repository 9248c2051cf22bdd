//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the scanner server:
//! - HTTP request metrics (latency, counts, errors)
//! - WebSocket connection metrics
//! - Scan counters and display status (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::error;

use dayoff_core::ScreenStatus;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "dayoff_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("dayoff_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "dayoff_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("dayoff_auth_failures_total", "Total authentication failures"),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// WebSocket Metrics
// =============================================================================

/// Active WebSocket connections.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "dayoff_ws_connections_active",
        "Number of active WebSocket connections",
    )
    .unwrap()
});

/// Total WebSocket connections (cumulative).
pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "dayoff_ws_connections_total",
        "Total WebSocket connections since startup",
    )
    .unwrap()
});

/// WebSocket messages sent by type.
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("dayoff_ws_messages_sent_total", "WebSocket messages sent"),
        &["type"],
    )
    .unwrap()
});

/// WebSocket lag events (when client falls behind).
pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "dayoff_ws_lag_events_total",
        "WebSocket lag events (client fell behind)",
    )
    .unwrap()
});

// =============================================================================
// Scanner Metrics (collected dynamically)
// =============================================================================

/// Persisted scan counters by bucket.
pub static SETTINGS_STATS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("dayoff_settings_stats", "Persisted scan counters by bucket"),
        &["bucket"],
    )
    .unwrap()
});

/// Currently displayed status (1 for the active one, 0 otherwise).
pub static DISPLAY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("dayoff_display_status", "Currently displayed status"),
        &["status"],
    )
    .unwrap()
});

/// Whether the device holds an attendance API token.
pub static TOKEN_CONFIGURED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "dayoff_token_configured",
        "Whether an attendance API token is configured (1) or not (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // WebSocket
    registry
        .register(Box::new(WS_CONNECTIONS_ACTIVE.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_CONNECTIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(WS_MESSAGES_SENT.clone()))
        .unwrap();
    registry.register(Box::new(WS_LAG_EVENTS.clone())).unwrap();

    // Scanner
    registry
        .register(Box::new(SETTINGS_STATS.clone()))
        .unwrap();
    registry
        .register(Box::new(DISPLAY_STATUS.clone()))
        .unwrap();
    registry
        .register(Box::new(TOKEN_CONFIGURED.clone()))
        .unwrap();

    // Core metrics (scan dispatch, attendance API)
    for metric in dayoff_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

const ALL_STATUSES: [ScreenStatus; 10] = [
    ScreenStatus::Initialized,
    ScreenStatus::Loading,
    ScreenStatus::InvalidTicket,
    ScreenStatus::InvalidDirection,
    ScreenStatus::Unauthorized,
    ScreenStatus::SystemError,
    ScreenStatus::Valid,
    ScreenStatus::CheckInSuccess,
    ScreenStatus::CheckOutSuccess,
    ScreenStatus::ConfigUpdated,
];

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the scanner right now.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let scanner = state.scanner();

    let settings = scanner.settings().await;
    let stats = settings.stats;
    SETTINGS_STATS
        .with_label_values(&["success"])
        .set(stats.success as i64);
    SETTINGS_STATS.with_label_values(&["fail"]).set(stats.fail as i64);
    SETTINGS_STATS
        .with_label_values(&["error"])
        .set(stats.error as i64);
    TOKEN_CONFIGURED.set(if settings.has_token() { 1 } else { 0 });

    let current = scanner.status().await.status;
    for status in ALL_STATUSES {
        DISPLAY_STATUS
            .with_label_values(&[status.as_str()])
            .set(if status == current { 1 } else { 0 });
    }
}

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});
static TICKET_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/tickets/[^/]+").unwrap());
static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_REGEX.replace_all(path, "{id}");
    let result = TICKET_REGEX.replace_all(&result, "/tickets/{id}");
    let result = NUMERIC_REGEX.replace_all(&result, "/{id}$1");
    result.to_string()
}
