//! Recording a gate event and turning the answer into a display state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::attendance::{AttendanceApi, AttendanceError};
use crate::metrics::{ATTENDANCE_REJECTIONS, CHECKIN_DURATION};
use crate::settings::Direction;
use crate::status::ScreenStatus;

/// Marker of the most recent successful check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastCheckin {
    pub ticket: String,
    pub direction: Direction,
    pub request_id: Option<String>,
    pub at: DateTime<Utc>,
}

/// Issues check-ins against the attendance API.
///
/// Direction alternation is enforced by the server (error 40316); no
/// client-side lookup is made before checking in.
pub struct TicketWorkflow {
    api: Arc<dyn AttendanceApi>,
    last_success: RwLock<Option<LastCheckin>>,
}

impl TicketWorkflow {
    pub fn new(api: Arc<dyn AttendanceApi>) -> Self {
        Self {
            api,
            last_success: RwLock::new(None),
        }
    }

    pub fn api(&self) -> &Arc<dyn AttendanceApi> {
        &self.api
    }

    pub async fn last_success(&self) -> Option<LastCheckin> {
        self.last_success.read().await.clone()
    }

    /// Record `direction` for `ticket` and map the outcome to a display state.
    pub async fn checkin(&self, ticket: &str, direction: Direction, token: &str) -> ScreenStatus {
        let start = Instant::now();
        let result = self.api.checkin(ticket, direction, token).await;
        let elapsed = start.elapsed().as_secs_f64();

        match result {
            Ok(receipt) => {
                CHECKIN_DURATION.with_label_values(&["success"]).observe(elapsed);
                info!(
                    ticket = ticket,
                    direction = %direction,
                    request_id = receipt.request_id.as_deref().unwrap_or("-"),
                    "Checkin recorded"
                );
                *self.last_success.write().await = Some(LastCheckin {
                    ticket: ticket.to_string(),
                    direction,
                    request_id: receipt.request_id,
                    at: Utc::now(),
                });
                match direction {
                    Direction::Out => ScreenStatus::CheckOutSuccess,
                    Direction::In => ScreenStatus::CheckInSuccess,
                }
            }
            Err(AttendanceError::Rejected { code, message, .. }) => {
                CHECKIN_DURATION.with_label_values(&["rejected"]).observe(elapsed);
                ATTENDANCE_REJECTIONS
                    .with_label_values(&[&code.to_string()])
                    .inc();
                let status = ScreenStatus::from_error_code(code);
                info!(ticket = ticket, code, status = %status, "Checkin rejected: {}", message);
                status
            }
            Err(e) => {
                CHECKIN_DURATION.with_label_values(&["failed"]).observe(elapsed);
                warn!(ticket = ticket, error = %e, "Checkin failed");
                ScreenStatus::SystemError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAttendanceApi, RecordedCall};

    fn workflow() -> (TicketWorkflow, Arc<MockAttendanceApi>) {
        let api = Arc::new(MockAttendanceApi::new());
        (TicketWorkflow::new(api.clone()), api)
    }

    #[tokio::test]
    async fn test_success_maps_by_direction() {
        let (workflow, api) = workflow();

        assert_eq!(
            workflow.checkin("ab12", Direction::In, "tk").await,
            ScreenStatus::CheckInSuccess
        );
        assert_eq!(
            workflow.checkin("ab12", Direction::Out, "tk").await,
            ScreenStatus::CheckOutSuccess
        );
        assert_eq!(
            api.calls().await,
            vec![
                RecordedCall::Checkin {
                    ticket: "ab12".to_string(),
                    direction: Direction::In,
                    token: "tk".to_string(),
                },
                RecordedCall::Checkin {
                    ticket: "ab12".to_string(),
                    direction: Direction::Out,
                    token: "tk".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_success_updates_marker() {
        let (workflow, api) = workflow();
        api.set_request_id(Some("req-9")).await;

        assert!(workflow.last_success().await.is_none());
        workflow.checkin("ab12", Direction::Out, "tk").await;

        let marker = workflow.last_success().await.unwrap();
        assert_eq!(marker.ticket, "ab12");
        assert_eq!(marker.direction, Direction::Out);
        assert_eq!(marker.request_id.as_deref(), Some("req-9"));
    }

    #[tokio::test]
    async fn test_rejections_map_through_code_table() {
        let (workflow, api) = workflow();
        let cases = [
            (40101, ScreenStatus::Unauthorized),
            (40314, ScreenStatus::InvalidTicket),
            (40316, ScreenStatus::InvalidDirection),
            (50001, ScreenStatus::SystemError),
        ];
        for (code, expected) in cases {
            api.fail_next_checkin(MockAttendanceApi::rejection(code)).await;
            assert_eq!(workflow.checkin("ab12", Direction::In, "tk").await, expected);
        }
        assert!(workflow.last_success().await.is_none());
    }

    #[tokio::test]
    async fn test_transport_failures_are_system_errors() {
        let (workflow, api) = workflow();

        api.fail_next_checkin(AttendanceError::Timeout).await;
        assert_eq!(
            workflow.checkin("ab12", Direction::In, "tk").await,
            ScreenStatus::SystemError
        );

        api.fail_next_checkin(AttendanceError::UnexpectedStatus {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        })
        .await;
        assert_eq!(
            workflow.checkin("ab12", Direction::In, "tk").await,
            ScreenStatus::SystemError
        );
    }
}
