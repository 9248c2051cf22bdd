//! Scan dispatch: from a scanned string to a display state.

mod checkin;
mod debounce;

pub use checkin::*;
pub use debounce::*;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::attendance::{AttendanceApi, AttendanceError, TicketStatus};
use crate::classifier::{ScanClassifier, ScanKind};
use crate::config::ScannerConfig;
use crate::metrics::{SCANS_TOTAL, SCAN_OUTCOMES};
use crate::settings::{token_fingerprint, Settings, SettingsPayload, SettingsStore};
use crate::status::{ScreenStatus, StatusBoard, StatusPresenter, StatusSnapshot};
use crate::verify::{OwnerVerifier, IMPORT_REASON};

/// Why a scan was not looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// A check-in is in progress.
    Busy,
    /// The same code was read moments ago.
    Duplicate,
}

impl IgnoreReason {
    pub fn as_str(self) -> &'static str {
        match self {
            IgnoreReason::Busy => "busy",
            IgnoreReason::Duplicate => "duplicate",
        }
    }
}

/// Result of handing one scanned string to the scanner.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    Completed(StatusSnapshot),
    Ignored { reason: IgnoreReason },
}

impl ScanOutcome {
    /// Final status, if the scan was handled.
    pub fn status(&self) -> Option<ScreenStatus> {
        match self {
            ScanOutcome::Completed(snapshot) => Some(snapshot.status),
            ScanOutcome::Ignored { .. } => None,
        }
    }
}

/// The gate scanner: owns the settings, the display board and the check-in client.
pub struct Scanner {
    classifier: ScanClassifier,
    tickets: TicketWorkflow,
    store: SettingsStore,
    settings: RwLock<Settings>,
    board: StatusBoard,
    debouncer: Mutex<ScanDebouncer>,
}

impl Scanner {
    /// Build a scanner; settings are loaded from the store once, here.
    pub fn new(
        config: &ScannerConfig,
        api: Arc<dyn AttendanceApi>,
        store: SettingsStore,
        presenter: Arc<dyn StatusPresenter>,
    ) -> Self {
        let settings = store.get();
        info!(
            name = %settings.name,
            direction = %settings.direction,
            token_configured = settings.has_token(),
            "Scanner settings loaded"
        );

        Self {
            classifier: ScanClassifier::new(&config.pass_host),
            tickets: TicketWorkflow::new(api),
            store,
            settings: RwLock::new(settings),
            board: StatusBoard::new(presenter, Duration::from_secs(config.revert_after_secs)),
            debouncer: Mutex::new(ScanDebouncer::new(Duration::from_secs(
                config.duplicate_window_secs,
            ))),
        }
    }

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub async fn status(&self) -> StatusSnapshot {
        self.board.current().await
    }

    pub async fn last_checkin(&self) -> Option<LastCheckin> {
        self.tickets.last_success().await
    }

    /// Handle one scanned string.
    pub async fn handle_scan(&self, text: &str, verifier: &dyn OwnerVerifier) -> ScanOutcome {
        let scan_id = Uuid::new_v4();

        if !self.debouncer.lock().await.admit(text, Instant::now()) {
            debug!(%scan_id, "Duplicate scan ignored");
            return self.ignored(IgnoreReason::Duplicate);
        }
        if !self.board.accepting_scans().await {
            debug!(%scan_id, "Scan ignored while busy");
            return self.ignored(IgnoreReason::Busy);
        }

        let kind = self.classifier.classify(text);
        SCANS_TOTAL.with_label_values(&[kind.label()]).inc();
        debug!(%scan_id, kind = kind.label(), "Scan classified");

        let snapshot = match kind {
            ScanKind::Ticket(ticket) => match self.check_in(&ticket).await {
                Some(snapshot) => snapshot,
                None => return self.ignored(IgnoreReason::Busy),
            },
            ScanKind::Settings(payload) => match self.import_settings(payload, verifier).await {
                Some(snapshot) => snapshot,
                None => return self.ignored(IgnoreReason::Busy),
            },
            ScanKind::Unrecognized => {
                match self.claim_and_record(ScreenStatus::InvalidTicket).await {
                    Some(snapshot) => snapshot,
                    None => return self.ignored(IgnoreReason::Busy),
                }
            }
        };

        info!(%scan_id, status = %snapshot.status, "Scan handled");
        ScanOutcome::Completed(snapshot)
    }

    /// The capture layer failed to read a code.
    ///
    /// While a check-in or an import holds the display the failure is only
    /// logged and the current status is returned.
    pub async fn scan_failed(&self, reason: &str) -> StatusSnapshot {
        warn!(reason = reason, "Scan failed");
        match self.claim_and_record(ScreenStatus::SystemError).await {
            Some(snapshot) => snapshot,
            None => {
                debug!("Display busy, scan failure not shown");
                self.board.current().await
            }
        }
    }

    /// Look up a pass with this gate's token.
    pub async fn lookup_ticket(&self, ticket: &str) -> Result<TicketStatus, AttendanceError> {
        let token = self.settings.read().await.token.clone();
        self.tickets.api().ticket_status(ticket, &token).await
    }

    async fn check_in(&self, ticket: &str) -> Option<StatusSnapshot> {
        self.board.claim(ScreenStatus::Loading).await?;

        let (direction, token) = {
            let settings = self.settings.read().await;
            (settings.direction, settings.token.clone())
        };
        let status = self.tickets.checkin(ticket, direction, &token).await;
        Some(self.finish(status).await)
    }

    /// Holds the display in Loading from verification until the import settles.
    async fn import_settings(
        &self,
        payload: SettingsPayload,
        verifier: &dyn OwnerVerifier,
    ) -> Option<StatusSnapshot> {
        self.board.claim(ScreenStatus::Loading).await?;

        // A gate without a token has nothing to protect yet.
        let provisioned = self.settings.read().await.has_token();
        if provisioned {
            if let Err(e) = verifier.verify(IMPORT_REASON).await {
                info!(method = verifier.method_name(), error = %e, "Settings import not approved");
                return Some(self.finish(ScreenStatus::InvalidTicket).await);
            }
        }

        let imported = {
            let mut settings = self.settings.write().await;
            match self.store.import(payload, settings.stats) {
                Ok(imported) => {
                    info!(
                        name = %imported.name,
                        direction = %imported.direction,
                        token = %token_fingerprint(&imported.token),
                        "Settings imported"
                    );
                    *settings = imported;
                    true
                }
                Err(e) => {
                    error!(error = %e, "Failed to import settings");
                    false
                }
            }
        };

        let status = if imported {
            ScreenStatus::ConfigUpdated
        } else {
            ScreenStatus::SystemError
        };
        Some(self.finish(status).await)
    }

    /// Count the outcome and put the status on a board this scan already holds.
    async fn finish(&self, status: ScreenStatus) -> StatusSnapshot {
        self.record(status).await;
        self.board.show(status).await
    }

    /// Put the status up only if nothing else holds the board, then count it.
    async fn claim_and_record(&self, status: ScreenStatus) -> Option<StatusSnapshot> {
        let snapshot = self.board.claim(status).await?;
        self.record(status).await;
        Some(snapshot)
    }

    async fn record(&self, status: ScreenStatus) {
        let mut settings = self.settings.write().await;
        settings.stats.record(status);
        if let Err(e) = self.store.persist(&settings) {
            warn!(error = %e, "Failed to persist settings");
        }
        SCAN_OUTCOMES.with_label_values(&[status.as_str()]).inc();
    }

    fn ignored(&self, reason: IgnoreReason) -> ScanOutcome {
        SCANS_TOTAL.with_label_values(&[reason.as_str()]).inc();
        ScanOutcome::Ignored { reason }
    }
}
