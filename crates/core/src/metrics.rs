//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Scan dispatch (kinds, outcomes)
//! - Attendance API calls (latency, rejection codes)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Scans
// =============================================================================

/// Scans received by kind.
pub static SCANS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("dayoff_scans_total", "Total scans received"),
        &["kind"], // "ticket", "settings", "unrecognized", "busy", "duplicate"
    )
    .unwrap()
});

/// Final display status of each handled scan.
pub static SCAN_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("dayoff_scan_outcomes_total", "Scan outcomes by final status"),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Attendance API
// =============================================================================

/// Check-in call duration in seconds.
pub static CHECKIN_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "dayoff_checkin_duration_seconds",
            "Duration of attendance check-in calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 3.0, 5.0]),
        &["result"], // "success", "rejected", "failed"
    )
    .unwrap()
});

/// Rejections by server error code.
pub static ATTENDANCE_REJECTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "dayoff_attendance_rejections_total",
            "Attendance API rejections by error code",
        ),
        &["code"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SCANS_TOTAL.clone()),
        Box::new(SCAN_OUTCOMES.clone()),
        Box::new(CHECKIN_DURATION.clone()),
        Box::new(ATTENDANCE_REJECTIONS.clone()),
    ]
}
