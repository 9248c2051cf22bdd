//! Screen states shown on the gate display.

mod board;
mod presenter;

pub use board::*;
pub use presenter::*;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// The ten mutually exclusive states of the gate display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenStatus {
    Initialized,
    Loading,

    InvalidTicket,
    InvalidDirection,
    /// This gate's token lacks the privilege to record passes.
    Unauthorized,
    SystemError,

    /// Ticket accepted, check-in/out report in progress.
    Valid,
    CheckInSuccess,
    CheckOutSuccess,
    ConfigUpdated,
}

/// Tone of the display background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visual {
    Neutral,
    Positive,
    Negative,
}

/// Which running counter a status contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Success,
    Fail,
    Error,
}

/// Static presentation of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusInfo {
    pub title: &'static str,
    pub description: &'static str,
    pub visual: Visual,
    /// New scans are ignored while this is set.
    pub hide_scanning: bool,
}

const READY: &str = "可以继续扫码。";

impl ScreenStatus {
    pub fn info(self) -> StatusInfo {
        let (title, description, visual, hide_scanning) = match self {
            ScreenStatus::Initialized => ("已就绪", READY, Visual::Neutral, false),
            ScreenStatus::Loading => ("查驗中", "系统正在查验请假码状态", Visual::Neutral, true),
            ScreenStatus::InvalidTicket => (
                "无效凭证",
                "该二维码不是杭电助手请假单码，或该请假已经过期，禁止出入。",
                Visual::Negative,
                false,
            ),
            ScreenStatus::InvalidDirection => (
                "方向错误",
                "本次出入方向与上一次一致，禁止连续出校或入校。",
                Visual::Negative,
                false,
            ),
            ScreenStatus::Unauthorized => (
                "没有权限",
                "本机授权失败，请联系相关人员授权",
                Visual::Negative,
                false,
            ),
            ScreenStatus::SystemError => (
                "系统错误",
                "发生错误，请尝试重扫，若问题持续存在请联系杭电助手。",
                Visual::Negative,
                false,
            ),
            ScreenStatus::Valid => (
                "請稍後",
                "请等待系统完成出入闸状态上报。",
                Visual::Neutral,
                true,
            ),
            ScreenStatus::CheckInSuccess => ("入校成功", READY, Visual::Positive, false),
            ScreenStatus::CheckOutSuccess => ("出校成功", READY, Visual::Positive, false),
            ScreenStatus::ConfigUpdated => ("配置成功", READY, Visual::Positive, false),
        };

        StatusInfo {
            title,
            description,
            visual,
            hide_scanning,
        }
    }

    /// Whether the display falls back to `Initialized` after a delay.
    pub fn auto_reverts(self) -> bool {
        !matches!(
            self,
            ScreenStatus::Initialized | ScreenStatus::Loading | ScreenStatus::Valid
        )
    }

    pub fn counter(self) -> Option<Counter> {
        match self {
            ScreenStatus::CheckInSuccess | ScreenStatus::CheckOutSuccess => Some(Counter::Success),
            ScreenStatus::InvalidTicket | ScreenStatus::InvalidDirection => Some(Counter::Fail),
            ScreenStatus::SystemError | ScreenStatus::Unauthorized => Some(Counter::Error),
            _ => None,
        }
    }

    /// Map an attendance API error code onto a display state.
    pub fn from_error_code(code: i64) -> Self {
        match code {
            40100 | 40101 | 40302 => ScreenStatus::Unauthorized,
            40306 | 40314 => ScreenStatus::InvalidTicket,
            40316 => ScreenStatus::InvalidDirection,
            _ => ScreenStatus::SystemError,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScreenStatus::Initialized => "initialized",
            ScreenStatus::Loading => "loading",
            ScreenStatus::InvalidTicket => "invalid_ticket",
            ScreenStatus::InvalidDirection => "invalid_direction",
            ScreenStatus::Unauthorized => "unauthorized",
            ScreenStatus::SystemError => "system_error",
            ScreenStatus::Valid => "valid",
            ScreenStatus::CheckInSuccess => "check_in_success",
            ScreenStatus::CheckOutSuccess => "check_out_success",
            ScreenStatus::ConfigUpdated => "config_updated",
        }
    }
}

impl fmt::Display for ScreenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status as it was put on the display.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub status: ScreenStatus,
    pub info: StatusInfo,
    pub changed_at: DateTime<Utc>,
}

impl StatusSnapshot {
    pub fn new(status: ScreenStatus) -> Self {
        Self {
            status,
            info: status.info(),
            changed_at: Utc::now(),
        }
    }
}
