pub mod attendance;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod metrics;
pub mod scan_source;
pub mod settings;
pub mod status;
pub mod testing;
pub mod verify;
pub mod workflow;

pub use attendance::{
    AttendanceApi, AttendanceError, CheckinReceipt, HttpAttendanceClient, TicketStatus,
};
pub use auth::{
    create_authenticator, ApiKeyAuthenticator, AuthError, AuthRequest, Authenticator, Caller,
    NoneAuthenticator,
};
pub use classifier::{ScanClassifier, ScanKind};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, Config, ConfigError,
    SanitizedConfig,
};
pub use scan_source::{blocking_lines, run_scan_source, stdin_lines};
pub use settings::{
    Direction, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SanitizedSettings,
    Settings, SettingsStore, Stats, StorageError,
};
pub use status::{
    FanoutPresenter, LogPresenter, ScreenStatus, StatusBoard, StatusPresenter, StatusSnapshot,
};
pub use verify::{ApproveAll, DenyAll, OwnerVerifier, PasscodeVerifier, VerifyError};
pub use workflow::{IgnoreReason, LastCheckin, ScanOutcome, Scanner};
