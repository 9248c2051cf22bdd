//! The current display state and its timed fallback to "ready".

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

use super::{ScreenStatus, StatusPresenter, StatusSnapshot};

#[derive(Debug)]
struct BoardState {
    current: StatusSnapshot,
    /// Bumped on every change; a revert timer only fires for its own generation.
    generation: u64,
}

impl BoardState {
    fn replace(&mut self, status: ScreenStatus) -> StatusSnapshot {
        self.current = StatusSnapshot::new(status);
        self.generation += 1;
        self.current.clone()
    }
}

/// Holds the displayed status and notifies the presenter of each change.
#[derive(Clone)]
pub struct StatusBoard {
    state: Arc<Mutex<BoardState>>,
    presenter: Arc<dyn StatusPresenter>,
    revert_after: Duration,
}

impl StatusBoard {
    pub fn new(presenter: Arc<dyn StatusPresenter>, revert_after: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(BoardState {
                current: StatusSnapshot::new(ScreenStatus::Initialized),
                generation: 0,
            })),
            presenter,
            revert_after,
        }
    }

    pub async fn current(&self) -> StatusSnapshot {
        self.state.lock().await.current.clone()
    }

    /// Whether a new scan would be looked at right now.
    pub async fn accepting_scans(&self) -> bool {
        !self.state.lock().await.current.info.hide_scanning
    }

    /// Put a status on the display unconditionally.
    pub async fn show(&self, status: ScreenStatus) -> StatusSnapshot {
        let mut state = self.state.lock().await;
        self.apply(&mut state, status)
    }

    /// Put a status on the display unless scanning is currently hidden.
    ///
    /// The check and the change happen under one lock, so two concurrent
    /// scans cannot both claim the board.
    pub async fn claim(&self, status: ScreenStatus) -> Option<StatusSnapshot> {
        let mut state = self.state.lock().await;
        if state.current.info.hide_scanning {
            return None;
        }
        Some(self.apply(&mut state, status))
    }

    fn apply(&self, state: &mut BoardState, status: ScreenStatus) -> StatusSnapshot {
        let snapshot = state.replace(status);
        self.presenter.present(&snapshot);
        if status.auto_reverts() {
            self.schedule_revert(state.generation);
        }
        snapshot
    }

    fn schedule_revert(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let presenter = Arc::clone(&self.presenter);
        let delay = self.revert_after;

        tokio::spawn(async move {
            sleep(delay).await;
            let mut state = state.lock().await;
            if state.generation != generation {
                debug!(generation, "Status changed before revert, skipping");
                return;
            }
            let snapshot = state.replace(ScreenStatus::Initialized);
            presenter.present(&snapshot);
        });
    }
}
