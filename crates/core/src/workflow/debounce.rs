use std::time::Duration;

use tokio::time::Instant;

/// Suppresses a code that is read again while it is still in front of the camera.
///
/// Only the most recent code is remembered; a different code replaces it.
#[derive(Debug)]
pub struct ScanDebouncer {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl ScanDebouncer {
    /// A zero window disables suppression.
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns false when `text` repeats the last code within the window.
    pub fn admit(&mut self, text: &str, now: Instant) -> bool {
        if self.window.is_zero() {
            return true;
        }
        if let Some((last, seen_at)) = &self.last {
            if last == text && now.duration_since(*seen_at) < self.window {
                return false;
            }
        }
        self.last = Some((text.to_string(), now));
        true
    }
}
