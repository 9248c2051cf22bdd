//! Display and device state API handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use dayoff_core::{LastCheckin, SanitizedSettings, StatusSnapshot};

use crate::state::AppState;

/// Response for the current display state
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub snapshot: StatusSnapshot,
    /// Most recent successful check-in since startup
    pub last_checkin: Option<LastCheckin>,
}

/// Get the current display state
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let scanner = state.scanner();
    Json(StatusResponse {
        snapshot: scanner.status().await,
        last_checkin: scanner.last_checkin().await,
    })
}

/// Get the device settings with the token redacted
pub async fn get_settings(State(state): State<Arc<AppState>>) -> Json<SanitizedSettings> {
    let settings = state.scanner().settings().await;
    Json(SanitizedSettings::from(&settings))
}
