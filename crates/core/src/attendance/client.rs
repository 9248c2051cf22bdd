//! reqwest-backed attendance API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::config::AttendanceConfig;
use crate::settings::Direction;

use super::types::{request_id_from, Envelope, FailureResponse, TicketData};
use super::{AttendanceApi, AttendanceError, CheckinPayload, CheckinReceipt, TicketStatus};

const CHECKIN_PATH: &str = "/workflow/dayoff/management/checkin";
const TICKET_PATH: &str = "/workflow/dayoff/management/ticket";

/// HTTP client for the attendance API.
pub struct HttpAttendanceClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpAttendanceClient {
    pub fn new(config: &AttendanceConfig) -> Result<Self, AttendanceError> {
        let client = Client::builder()
            .user_agent(concat!("dayoff-scanner/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    fn checkin_url(&self, ticket: &str) -> String {
        format!(
            "{}{}?ticketId={}",
            self.base_url,
            CHECKIN_PATH,
            urlencoding::encode(ticket)
        )
    }

    fn ticket_url(&self, ticket: &str) -> String {
        format!(
            "{}{}?uid={}",
            self.base_url,
            TICKET_PATH,
            urlencoding::encode(ticket)
        )
    }

    /// Send with auth and timeout; any non-2xx becomes an error.
    async fn send(&self, request: RequestBuilder, token: &str) -> Result<Response, AttendanceError> {
        let response = request
            .header(AUTHORIZATION, format!("token {}", token))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AttendanceError::Timeout
                } else {
                    AttendanceError::Http(e)
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        match serde_json::from_slice::<FailureResponse>(&body) {
            Ok(failure) => {
                debug!(status = status.as_u16(), code = failure.error, "Attendance API rejected request");
                Err(AttendanceError::Rejected {
                    status: status.as_u16(),
                    code: failure.error,
                    message: failure.msg,
                })
            }
            Err(_) => {
                let body = String::from_utf8_lossy(&body);
                warn!(status = status.as_u16(), "Attendance API returned undecodable error body");
                Err(AttendanceError::UnexpectedStatus {
                    status: status.as_u16(),
                    body: body.chars().take(200).collect(),
                })
            }
        }
    }
}

#[async_trait]
impl AttendanceApi for HttpAttendanceClient {
    async fn checkin(
        &self,
        ticket: &str,
        direction: Direction,
        token: &str,
    ) -> Result<CheckinReceipt, AttendanceError> {
        let payload = CheckinPayload {
            ticket: ticket.to_string(),
            direction,
        };
        debug!(ticket = ticket, direction = %direction, "Sending checkin");

        let request = self.client.post(self.checkin_url(ticket)).json(&payload);
        let response = self.send(request, token).await?;

        // The body is only consulted for the request id; success is the 2xx.
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                AttendanceError::Timeout
            } else {
                AttendanceError::Http(e)
            }
        })?;
        let request_id = serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| request_id_from(&value));

        Ok(CheckinReceipt { request_id })
    }

    async fn ticket_status(
        &self,
        ticket: &str,
        token: &str,
    ) -> Result<TicketStatus, AttendanceError> {
        debug!(ticket = ticket, "Looking up ticket");

        let request = self.client.get(self.ticket_url(ticket));
        let response = self.send(request, token).await?;

        let envelope: Envelope<TicketData> = response.json().await.map_err(|e| {
            AttendanceError::Parse(format!("Failed to parse ticket response: {}", e))
        })?;

        Ok(envelope.data.into())
    }
}
