use super::{types::Config, AuthMethod, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Attendance base URL is http(s) and the timeout is non-zero
/// - Pass host is set
/// - An API key is present when `auth.method = "api_key"`
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let base_url = config.attendance.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "attendance.base_url must be an http(s) URL, got '{}'",
            base_url
        )));
    }

    if config.attendance.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "attendance.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.scanner.pass_host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "scanner.pass_host cannot be empty".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().unwrap_or("").is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method is \"api_key\"".to_string(),
        ));
    }

    Ok(())
}
