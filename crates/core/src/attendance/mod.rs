//! Remote attendance API: recording gate events against passes.

mod client;
mod types;

pub use client::HttpAttendanceClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::settings::Direction;

/// Errors from the attendance API.
///
/// `Rejected` is an application error with a server-assigned code; every other
/// variant is a transport or validation failure.
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Server refused the request with an error code.
    #[error("Rejected by attendance API: {code} - {message}")]
    Rejected {
        status: u16,
        code: i64,
        message: String,
    },

    /// Non-2xx response without a decodable error body.
    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// 2xx response whose body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl AttendanceError {
    /// Server error code, if the server returned one.
    pub fn code(&self) -> Option<i64> {
        match self {
            AttendanceError::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Client for the attendance API.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    /// Record a gate event for a ticket.
    async fn checkin(
        &self,
        ticket: &str,
        direction: Direction,
        token: &str,
    ) -> Result<CheckinReceipt, AttendanceError>;

    /// Look up a pass and its last recorded direction.
    async fn ticket_status(&self, ticket: &str, token: &str)
        -> Result<TicketStatus, AttendanceError>;
}
