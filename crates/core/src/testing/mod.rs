//! Testing utilities and mock implementations.
//!
//! Lets the scanner and the HTTP API be exercised end to end without a
//! remote attendance service or a real display.
//!
//! # Example
//!
//! ```rust,ignore
//! use dayoff_core::testing::{fixtures, MockAttendanceApi, RecordingPresenter};
//!
//! let api = Arc::new(MockAttendanceApi::new());
//! let presenter = Arc::new(RecordingPresenter::new());
//! let scanner = Scanner::new(&ScannerConfig::default(), api.clone(), store, presenter.clone());
//!
//! scanner.handle_scan(&fixtures::pass_url("ab12"), &DenyAll).await;
//! assert_eq!(api.checkin_count().await, 1);
//! ```

mod mock_attendance;
mod recording_presenter;

pub use mock_attendance::{MockAttendanceApi, RecordedCall};
pub use recording_presenter::RecordingPresenter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::attendance::{DayoffKind, LastDirection, PassState, TicketStatus};
    use crate::classifier::DEFAULT_PASS_HOST;
    use crate::settings::{Direction, Settings, Stats};

    /// Token used by [`provisioned_settings`].
    pub const GATE_TOKEN: &str = "gate-token";

    /// Settings of a gate that already has a token.
    pub fn provisioned_settings(direction: Direction) -> Settings {
        Settings {
            token: GATE_TOKEN.to_string(),
            direction,
            name: "南门".to_string(),
            stats: Stats::default(),
        }
    }

    /// A pass URL as printed in the QR code.
    pub fn pass_url(ticket: &str) -> String {
        format!("https://{}/pass?id={}", DEFAULT_PASS_HOST, ticket)
    }

    /// A provisioning QR code body.
    pub fn settings_json(
        token: &str,
        direction: Direction,
        name: &str,
        stats: Option<Stats>,
    ) -> String {
        let mut value = serde_json::json!({
            "token": token,
            "direction": direction.code(),
            "name": name,
        });
        if let Some(stats) = stats {
            value["stats"] = serde_json::json!(stats);
        }
        value.to_string()
    }

    /// A pass that has been used once, on the way out.
    pub fn ticket_status(ticket: &str) -> TicketStatus {
        TicketStatus {
            ticket_id: ticket.to_string(),
            kind: DayoffKind::Under2Hours,
            state: PassState::RecordFound,
            last_direction: LastDirection::Out,
            out_time: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).single(),
            back_time: None,
            staff_id: "21051234".to_string(),
            staff_name: "张三".to_string(),
        }
    }
}
