//! Sinks for status changes: the display layer lives outside this crate.

use std::sync::Arc;

use tracing::info;

use super::StatusSnapshot;

/// Receives every status put on the board, in order.
///
/// Called while the board is locked, so implementations must not block.
pub trait StatusPresenter: Send + Sync {
    fn present(&self, snapshot: &StatusSnapshot);
}

/// Writes status changes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl StatusPresenter for LogPresenter {
    fn present(&self, snapshot: &StatusSnapshot) {
        info!(
            status = %snapshot.status,
            title = snapshot.info.title,
            "{}",
            snapshot.info.description
        );
    }
}

/// Forwards each status to several presenters.
#[derive(Default, Clone)]
pub struct FanoutPresenter {
    presenters: Vec<Arc<dyn StatusPresenter>>,
}

impl FanoutPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, presenter: Arc<dyn StatusPresenter>) -> Self {
        self.presenters.push(presenter);
        self
    }
}

impl StatusPresenter for FanoutPresenter {
    fn present(&self, snapshot: &StatusSnapshot) {
        for presenter in &self.presenters {
            presenter.present(snapshot);
        }
    }
}
