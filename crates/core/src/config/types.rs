use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    pub attendance: AttendanceConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration for this service's own API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Shared key, required when `method = "api_key"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    ApiKey,
}

/// Remote attendance API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttendanceConfig {
    /// Base URL of the attendance API (e.g. "https://api.example.edu").
    pub base_url: String,
    /// Per-request timeout in seconds (default: 5).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    5
}

/// Scan dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
    /// Host that issues pass URLs.
    #[serde(default = "default_pass_host")]
    pub pass_host: String,
    /// Seconds before a transient status reverts to "initialized".
    #[serde(default = "default_revert_after")]
    pub revert_after_secs: u64,
    /// Identical scans within this window are ignored.
    #[serde(default = "default_duplicate_window")]
    pub duplicate_window_secs: u64,
    /// Passcode required to replace settings on an already-provisioned device.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_passcode: Option<String>,
    /// Feed stdin lines into the scanner.
    #[serde(default)]
    pub read_stdin: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            pass_host: default_pass_host(),
            revert_after_secs: default_revert_after(),
            duplicate_window_secs: default_duplicate_window(),
            import_passcode: None,
            read_stdin: false,
        }
    }
}

fn default_pass_host() -> String {
    "qr.hduhelp.com".to_string()
}

fn default_revert_after() -> u64 {
    4
}

fn default_duplicate_window() -> u64 {
    7
}

/// Local key-value storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("dayoff-data")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub attendance: AttendanceConfig,
    pub scanner: SanitizedScannerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
}

/// Scanner config with the import passcode hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedScannerConfig {
    pub pass_host: String,
    pub revert_after_secs: u64,
    pub duplicate_window_secs: u64,
    pub import_passcode_configured: bool,
    pub read_stdin: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::ApiKey => "api_key".to_string(),
                },
            },
            server: config.server.clone(),
            attendance: config.attendance.clone(),
            scanner: SanitizedScannerConfig {
                pass_host: config.scanner.pass_host.clone(),
                revert_after_secs: config.scanner.revert_after_secs,
                duplicate_window_secs: config.scanner.duplicate_window_secs,
                import_passcode_configured: config
                    .scanner
                    .import_passcode
                    .as_deref()
                    .is_some_and(|p| !p.is_empty()),
                read_stdin: config.scanner.read_stdin,
            },
            storage: config.storage.clone(),
        }
    }
}
