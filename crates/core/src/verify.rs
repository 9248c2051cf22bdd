//! Owner confirmation before a device is re-provisioned.

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::constant_time_eq;

/// Prompt shown to whoever is asked to confirm an import.
pub const IMPORT_REASON: &str = "如您不知道为何触发此验证，请选择「取消」。";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Owner verification declined")]
    Declined,

    #[error("No passcode provided")]
    NotProvided,

    #[error("Passcode mismatch")]
    Mismatch,

    #[error("Owner verification unavailable: {0}")]
    Unavailable(String),
}

/// Confirms that the device owner approves a sensitive action.
#[async_trait]
pub trait OwnerVerifier: Send + Sync {
    async fn verify(&self, reason: &str) -> Result<(), VerifyError>;

    /// Name of this verification method
    fn method_name(&self) -> &'static str;
}

/// Approves everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApproveAll;

#[async_trait]
impl OwnerVerifier for ApproveAll {
    async fn verify(&self, _reason: &str) -> Result<(), VerifyError> {
        Ok(())
    }

    fn method_name(&self) -> &'static str {
        "approve_all"
    }
}

/// Declines everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAll;

#[async_trait]
impl OwnerVerifier for DenyAll {
    async fn verify(&self, _reason: &str) -> Result<(), VerifyError> {
        Err(VerifyError::Declined)
    }

    fn method_name(&self) -> &'static str {
        "deny_all"
    }
}

/// Compares a passcode supplied with the scan against the configured one.
#[derive(Debug, Clone)]
pub struct PasscodeVerifier {
    expected: Option<String>,
    provided: Option<String>,
}

impl PasscodeVerifier {
    pub fn new(expected: Option<String>, provided: Option<String>) -> Self {
        Self { expected, provided }
    }
}

#[async_trait]
impl OwnerVerifier for PasscodeVerifier {
    async fn verify(&self, _reason: &str) -> Result<(), VerifyError> {
        let expected = self
            .expected
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| VerifyError::Unavailable("no import passcode configured".to_string()))?;
        let provided = self.provided.as_deref().ok_or(VerifyError::NotProvided)?;

        if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(VerifyError::Mismatch)
        }
    }

    fn method_name(&self) -> &'static str {
        "passcode"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_fixed_verifiers() {
        assert_ok!(ApproveAll.verify(IMPORT_REASON).await);
        assert_eq!(DenyAll.verify(IMPORT_REASON).await, Err(VerifyError::Declined));
    }

    #[tokio::test]
    async fn test_passcode_match() {
        let verifier = PasscodeVerifier::new(Some("2468".into()), Some("2468".into()));
        assert_ok!(verifier.verify(IMPORT_REASON).await);
    }

    #[tokio::test]
    async fn test_passcode_mismatch_or_missing() {
        let wrong = PasscodeVerifier::new(Some("2468".into()), Some("1357".into()));
        assert_eq!(wrong.verify(IMPORT_REASON).await, Err(VerifyError::Mismatch));

        let missing = PasscodeVerifier::new(Some("2468".into()), None);
        assert_eq!(missing.verify(IMPORT_REASON).await, Err(VerifyError::NotProvided));
    }

    #[tokio::test]
    async fn test_unconfigured_passcode_denies() {
        let verifier = PasscodeVerifier::new(None, Some("anything".into()));
        assert_err!(verifier.verify(IMPORT_REASON).await);

        let empty = PasscodeVerifier::new(Some(String::new()), Some(String::new()));
        assert_err!(empty.verify(IMPORT_REASON).await);
    }
}
