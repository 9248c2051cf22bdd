//! Pass lookup API handler.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use dayoff_core::{AttendanceError, ScreenStatus, TicketStatus};

use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct TicketErrorResponse {
    pub error: String,
    /// Attendance API error code, when the API returned one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

/// HTTP status for a failed lookup.
fn status_for(error: &AttendanceError) -> StatusCode {
    match error {
        AttendanceError::Rejected { code, .. } => match ScreenStatus::from_error_code(*code) {
            ScreenStatus::Unauthorized => StatusCode::UNAUTHORIZED,
            ScreenStatus::InvalidTicket => StatusCode::NOT_FOUND,
            ScreenStatus::InvalidDirection => StatusCode::CONFLICT,
            _ => StatusCode::BAD_GATEWAY,
        },
        AttendanceError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Look up a pass with the device token
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TicketStatus>, (StatusCode, Json<TicketErrorResponse>)> {
    match state.scanner().lookup_ticket(&id).await {
        Ok(status) => Ok(Json(status)),
        Err(e) => {
            warn!(ticket = %id, error = %e, "Ticket lookup failed");
            Err((
                status_for(&e),
                Json(TicketErrorResponse {
                    error: e.to_string(),
                    code: e.code(),
                }),
            ))
        }
    }
}
