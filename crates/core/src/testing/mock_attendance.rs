//! Mock attendance API for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::attendance::{AttendanceApi, AttendanceError, CheckinReceipt, TicketStatus};
use crate::settings::Direction;

/// A recorded call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Checkin {
        ticket: String,
        direction: Direction,
        token: String,
    },
    TicketStatus {
        ticket: String,
        token: String,
    },
}

/// Mock implementation of the AttendanceApi trait.
///
/// Provides controllable behavior for testing:
/// - Record every call for assertions
/// - Fail the next check-in or lookup with a chosen error
/// - Delay check-ins to hold the scanner busy
///
/// # Example
///
/// ```rust,ignore
/// use dayoff_core::testing::MockAttendanceApi;
///
/// let api = MockAttendanceApi::new();
/// api.fail_next_checkin(MockAttendanceApi::rejection(40316)).await;
///
/// let result = api.checkin("ab12", Direction::In, "token").await;
/// assert_eq!(result.unwrap_err().code(), Some(40316));
/// assert_eq!(api.checkin_count().await, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockAttendanceApi {
    /// Recorded calls, in order.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// Request id returned by successful check-ins.
    request_id: Arc<RwLock<Option<String>>>,
    /// If set, the next check-in fails with this error.
    next_checkin_error: Arc<RwLock<Option<AttendanceError>>>,
    /// Pass returned by lookups.
    ticket_status: Arc<RwLock<Option<TicketStatus>>>,
    /// If set, the next lookup fails with this error.
    next_lookup_error: Arc<RwLock<Option<AttendanceError>>>,
    /// Simulated check-in latency.
    delay: Arc<RwLock<Option<Duration>>>,
}

impl MockAttendanceApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// A server rejection carrying `code`.
    pub fn rejection(code: i64) -> AttendanceError {
        AttendanceError::Rejected {
            status: 403,
            code,
            message: format!("mock rejection {}", code),
        }
    }

    /// Get all recorded calls.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    pub async fn checkin_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, RecordedCall::Checkin { .. }))
            .count()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    pub async fn set_request_id(&self, request_id: Option<&str>) {
        *self.request_id.write().await = request_id.map(str::to_string);
    }

    pub async fn fail_next_checkin(&self, error: AttendanceError) {
        *self.next_checkin_error.write().await = Some(error);
    }

    pub async fn set_ticket_status(&self, status: TicketStatus) {
        *self.ticket_status.write().await = Some(status);
    }

    pub async fn fail_next_lookup(&self, error: AttendanceError) {
        *self.next_lookup_error.write().await = Some(error);
    }

    /// Make every following check-in take `delay` before answering.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }
}

#[async_trait]
impl AttendanceApi for MockAttendanceApi {
    async fn checkin(
        &self,
        ticket: &str,
        direction: Direction,
        token: &str,
    ) -> Result<CheckinReceipt, AttendanceError> {
        self.calls.write().await.push(RecordedCall::Checkin {
            ticket: ticket.to_string(),
            direction,
            token: token.to_string(),
        });

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.next_checkin_error.write().await.take() {
            return Err(error);
        }

        Ok(CheckinReceipt {
            request_id: self.request_id.read().await.clone(),
        })
    }

    async fn ticket_status(
        &self,
        ticket: &str,
        token: &str,
    ) -> Result<TicketStatus, AttendanceError> {
        self.calls.write().await.push(RecordedCall::TicketStatus {
            ticket: ticket.to_string(),
            token: token.to_string(),
        });

        if let Some(error) = self.next_lookup_error.write().await.take() {
            return Err(error);
        }

        match self.ticket_status.read().await.clone() {
            Some(status) if status.ticket_id == ticket => Ok(status),
            _ => Err(Self::rejection(40306)),
        }
    }
}
