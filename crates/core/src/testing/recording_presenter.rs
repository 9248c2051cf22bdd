//! Presenter that remembers what it was shown.

use std::sync::Mutex;

use crate::status::{ScreenStatus, StatusPresenter, StatusSnapshot};

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    snapshots: Mutex<Vec<StatusSnapshot>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> Vec<StatusSnapshot> {
        self.snapshots
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    pub fn statuses(&self) -> Vec<ScreenStatus> {
        self.snapshots().into_iter().map(|s| s.status).collect()
    }
}

impl StatusPresenter for RecordingPresenter {
    fn present(&self, snapshot: &StatusSnapshot) {
        if let Ok(mut snapshots) = self.snapshots.lock() {
            snapshots.push(snapshot.clone());
        }
    }
}
