//! Attendance API data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::Direction;

/// Body of the check-in request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinPayload {
    pub ticket: String,
    #[serde(rename = "type")]
    pub direction: Direction,
}

/// Result of a successful check-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckinReceipt {
    /// Server-side request id, when the server reports one.
    pub request_id: Option<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct FailureResponse {
    #[serde(default)]
    pub cache: bool,
    pub error: i64,
    #[serde(default)]
    pub msg: String,
}

/// Standard response envelope. Only the payload is needed here.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// Kind of leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", rename_all = "snake_case")]
pub enum DayoffKind {
    Under2Hours,
    Over2Hours,
    Intern,
    Other,
}

impl TryFrom<u8> for DayoffKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(DayoffKind::Under2Hours),
            2 => Ok(DayoffKind::Over2Hours),
            3 => Ok(DayoffKind::Intern),
            4 => Ok(DayoffKind::Other),
            other => Err(format!("unknown dayoff type {}", other)),
        }
    }
}

/// Whether the pass has been used yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", rename_all = "snake_case")]
pub enum PassState {
    NoRecord,
    RecordFound,
    Invalid,
}

impl TryFrom<u8> for PassState {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PassState::NoRecord),
            1 => Ok(PassState::RecordFound),
            2 => Ok(PassState::Invalid),
            other => Err(format!("unknown pass status {}", other)),
        }
    }
}

/// Direction of the last recorded gate event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", rename_all = "snake_case")]
pub enum LastDirection {
    NoRecord,
    In,
    Out,
}

impl TryFrom<u8> for LastDirection {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(LastDirection::NoRecord),
            1 => Ok(LastDirection::In),
            2 => Ok(LastDirection::Out),
            other => Err(format!("unknown last direction {}", other)),
        }
    }
}

/// Pass details as reported by the ticket lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketStatus {
    pub ticket_id: String,
    pub kind: DayoffKind,
    pub state: PassState,
    pub last_direction: LastDirection,
    pub out_time: Option<DateTime<Utc>>,
    pub back_time: Option<DateTime<Utc>>,
    pub staff_id: String,
    pub staff_name: String,
}

// ============================================================================
// Wire types for the ticket lookup (private)
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct TicketData {
    #[serde(rename = "dayOff")]
    day_off: WireDayoff,
    request: WireRequest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireDayoff {
    day_off_type: DayoffKind,
    #[serde(default)]
    out_time: Option<DateTime<Utc>>,
    #[serde(default)]
    back_time: Option<DateTime<Utc>>,
    status: PassState,
    direction: LastDirection,
    #[serde(rename = "UID")]
    uid: String,
}

#[derive(Debug, Deserialize)]
struct WireRequest {
    #[serde(rename = "StaffID")]
    staff_id: String,
    #[serde(rename = "StaffName")]
    staff_name: String,
}

impl From<TicketData> for TicketStatus {
    fn from(data: TicketData) -> Self {
        Self {
            ticket_id: data.day_off.uid,
            kind: data.day_off.day_off_type,
            state: data.day_off.status,
            last_direction: data.day_off.direction,
            out_time: data.day_off.out_time,
            back_time: data.day_off.back_time,
            staff_id: data.request.staff_id,
            staff_name: data.request.staff_name,
        }
    }
}

/// Pull a request id out of a check-in response body, wherever the server put it.
pub(crate) fn request_id_from(body: &serde_json::Value) -> Option<String> {
    let data = body.get("data")?;
    if let Some(id) = data.as_str() {
        return Some(id.to_string());
    }
    ["requestId", "RequestID", "request_id"]
        .iter()
        .find_map(|key| data.get(*key))
        .and_then(|id| match id {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}
