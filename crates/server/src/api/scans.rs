//! Scan submission API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use dayoff_core::{PasscodeVerifier, ScanOutcome, StatusSnapshot};

use super::middleware::AuthCaller;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a scanned string
#[derive(Debug, Deserialize)]
pub struct SubmitScanBody {
    /// Decoded QR payload
    pub text: String,
    /// Passcode confirming a settings import on a provisioned device
    pub passcode: Option<String>,
}

/// Request body for reporting a capture failure
#[derive(Debug, Deserialize)]
pub struct ReportFailureBody {
    pub reason: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ScanErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Hand a scanned string to the scanner
pub async fn submit_scan(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    Json(body): Json<SubmitScanBody>,
) -> Result<Json<ScanOutcome>, (StatusCode, Json<ScanErrorResponse>)> {
    if body.text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ScanErrorResponse {
                error: "text must not be empty".to_string(),
            }),
        ));
    }

    let verifier = PasscodeVerifier::new(
        state.config().scanner.import_passcode.clone(),
        body.passcode,
    );
    let outcome = state
        .scanner()
        .handle_scan(body.text.trim(), &verifier)
        .await;

    info!(caller = %caller, outcome = ?outcome.status(), "Scan submitted");
    Ok(Json(outcome))
}

/// The capture layer could not read a code
pub async fn report_failure(
    State(state): State<Arc<AppState>>,
    AuthCaller(caller): AuthCaller,
    Json(body): Json<ReportFailureBody>,
) -> Json<StatusSnapshot> {
    info!(caller = %caller, "Scan failure reported");
    Json(state.scanner().scan_failed(&body.reason).await)
}
