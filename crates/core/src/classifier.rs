//! Decides what a scanned string is.

use regex_lite::Regex;

use crate::settings::SettingsPayload;

/// Host that issues leave-of-absence pass URLs.
pub const DEFAULT_PASS_HOST: &str = "qr.hduhelp.com";

/// What a scanned string turned out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanKind {
    /// A pass URL; holds the ticket id.
    Ticket(String),
    /// A provisioning payload.
    Settings(SettingsPayload),
    Unrecognized,
}

impl ScanKind {
    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ScanKind::Ticket(_) => "ticket",
            ScanKind::Settings(_) => "settings",
            ScanKind::Unrecognized => "unrecognized",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanClassifier {
    ticket_url: Regex,
}

impl ScanClassifier {
    pub fn new(pass_host: &str) -> Self {
        let pattern = format!(
            r"^https?://{}/pass\?id=([0-9a-f-]+)",
            regex_lite::escape(pass_host)
        );
        // The host is escaped, so the pattern is always valid.
        let ticket_url = Regex::new(&pattern).expect("ticket URL pattern");
        Self { ticket_url }
    }

    /// Extract the ticket id from a pass URL.
    pub fn ticket_id<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.ticket_url
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn classify(&self, text: &str) -> ScanKind {
        if let Some(id) = self.ticket_id(text) {
            return ScanKind::Ticket(id.to_string());
        }
        match SettingsPayload::from_json(text) {
            Some(payload) => ScanKind::Settings(payload),
            None => ScanKind::Unrecognized,
        }
    }
}

impl Default for ScanClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PASS_HOST)
    }
}
