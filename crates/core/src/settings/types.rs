//! Settings record persisted on the gate device.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::status::{Counter, ScreenStatus};

/// Gate direction. Encoded on the wire as `-1` (in) and `1` (out).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DirectionRepr", into = "i8")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Wire code used by the attendance API and the settings blob.
    pub fn code(self) -> i8 {
        match self {
            Direction::In => -1,
            Direction::Out => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Direction> for i8 {
    fn from(direction: Direction) -> Self {
        direction.code()
    }
}

impl TryFrom<i8> for Direction {
    type Error = String;

    fn try_from(code: i8) -> Result<Self, Self::Error> {
        match code {
            -1 => Ok(Direction::In),
            1 => Ok(Direction::Out),
            other => Err(format!("invalid direction code {}", other)),
        }
    }
}

/// Accepted input forms: the numeric wire code or a lowercase name.
#[derive(Deserialize)]
#[serde(untagged)]
enum DirectionRepr {
    Code(i8),
    Name(String),
}

impl TryFrom<DirectionRepr> for Direction {
    type Error = String;

    fn try_from(repr: DirectionRepr) -> Result<Self, Self::Error> {
        match repr {
            DirectionRepr::Code(code) => Direction::try_from(code),
            DirectionRepr::Name(name) => match name.as_str() {
                "in" => Ok(Direction::In),
                "out" => Ok(Direction::Out),
                other => Err(format!("invalid direction '{}'", other)),
            },
        }
    }
}

/// Running scan counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub success: u64,
    pub fail: u64,
    pub error: u64,
}

impl Stats {
    /// Bump the counter bucket of a scan outcome. Returns whether anything changed.
    pub fn record(&mut self, status: ScreenStatus) -> bool {
        match status.counter() {
            Some(Counter::Success) => self.success += 1,
            Some(Counter::Fail) => self.fail += 1,
            Some(Counter::Error) => self.error += 1,
            None => return false,
        }
        true
    }
}

/// Device settings: API token, gate direction, display name and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub token: String,
    pub direction: Direction,
    pub name: String,
    #[serde(default)]
    pub stats: Stats,
}

/// Display name of a freshly installed gate.
pub const DEFAULT_GATE_NAME: &str = "默认闸口";

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: String::new(),
            direction: Direction::In,
            name: DEFAULT_GATE_NAME.to_string(),
            stats: Stats::default(),
        }
    }
}

impl Settings {
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Settings as scanned from a provisioning QR code. `stats` is optional so an
/// administrator can re-provision a gate without resetting its counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPayload {
    pub token: String,
    pub direction: Direction,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
}

impl SettingsPayload {
    /// Parse a scanned string. Anything that is not a complete settings object is `None`.
    pub fn from_json(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }
}

/// Settings view for API responses: the token is reduced to a fingerprint.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSettings {
    pub name: String,
    pub direction: Direction,
    pub stats: Stats,
    pub token_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_fingerprint: Option<String>,
}

impl From<&Settings> for SanitizedSettings {
    fn from(settings: &Settings) -> Self {
        Self {
            name: settings.name.clone(),
            direction: settings.direction,
            stats: settings.stats,
            token_configured: settings.has_token(),
            token_fingerprint: settings
                .has_token()
                .then(|| token_fingerprint(&settings.token)),
        }
    }
}

/// Short SHA-256 fingerprint, enough to tell two tokens apart in logs and APIs.
pub fn token_fingerprint(token: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(token.as_bytes()));
    digest[..12].to_string()
}
