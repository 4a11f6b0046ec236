//! Two-factor enrollment: wizard steps, code validation and backup codes

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Digits in a TOTP code produced by authenticator apps
pub const CODE_LENGTH: usize = 6;

pub const BACKUP_CODES_FILENAME: &str = "uvlhub_backup_codes.txt";
pub const BACKUP_CODES_HEADER: &str = "UVLHUB Two-Factor Backup Codes";
pub const BACKUP_CODES_NOTICE: &str =
    "Keep these codes in a safe place. Each code can only be used once.";

/// Fallback shown when the server rejects a code without saying why
pub const INVALID_CODE_MESSAGE: &str = "Invalid verification code";

/// Steps of the enrollment wizard, in the order the user walks them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WizardStep {
    /// QR code and manual secret
    #[default]
    ShowSecret = 1,
    /// Code entry and verification
    EnterCode = 2,
    /// Backup codes, shown once
    BackupCodes = 3,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::ShowSecret,
        WizardStep::EnterCode,
        WizardStep::BackupCodes,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Id of the step's panel in the setup template
    pub fn panel_id(self) -> String {
        format!("step{}", self.number())
    }

    pub fn indicator_id(self) -> String {
        format!("step{}-indicator", self.number())
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = StepError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WizardStep::ShowSecret),
            2 => Ok(WizardStep::EnterCode),
            3 => Ok(WizardStep::BackupCodes),
            other => Err(StepError::OutOfRange(other)),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}", self.number())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepError {
    #[error("wizard step {0} does not exist (expected 1-3)")]
    OutOfRange(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("verification code is empty")]
    Empty,
    #[error("verification code must be {expected} characters, got {found}")]
    WrongLength { expected: usize, found: usize },
    #[error("verification code must contain only digits")]
    NonDigit,
}

impl CodeError {
    /// Inline message shown under the code field
    pub fn user_message(&self) -> &'static str {
        "Please enter a valid 6-digit code"
    }
}

/// A code that passed client-side validation and may be sent to the server.
///
/// Surrounding whitespace is dropped; the rest must be exactly
/// [`CODE_LENGTH`] ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn parse(input: &str) -> Result<Self, CodeError> {
        let code = input.trim();
        if code.is_empty() {
            return Err(CodeError::Empty);
        }

        let found = code.chars().count();
        if found != CODE_LENGTH {
            return Err(CodeError::WrongLength {
                expected: CODE_LENGTH,
                found,
            });
        }

        if !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(CodeError::NonDigit);
        }

        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(******)")
    }
}

/// Body of the verification request
#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest<'a> {
    pub token: &'a str,
}

impl<'a> From<&'a VerificationCode> for VerifyRequest<'a> {
    fn from(code: &'a VerificationCode) -> Self {
        Self {
            token: code.as_str(),
        }
    }
}

/// Answer of the verification endpoint; rejections use a 400 status and the
/// same shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub backup_codes: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl VerifyResponse {
    pub fn failure_message(&self) -> &str {
        self.error
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or(INVALID_CODE_MESSAGE)
    }
}

/// One-time backup codes, in the order the server issued them
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BackupCodes(Vec<String>);

impl BackupCodes {
    pub fn new(codes: Vec<String>) -> Self {
        Self(codes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Plain-text export: header, blank line, one code per line, blank line,
    /// usage notice. `None` when there is nothing to export.
    pub fn to_document(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }

        Some(format!(
            "{}\n\n{}\n\n{}",
            BACKUP_CODES_HEADER,
            self.0.join("\n"),
            BACKUP_CODES_NOTICE
        ))
    }
}

impl From<Vec<String>> for BackupCodes {
    fn from(codes: Vec<String>) -> Self {
        Self::new(codes)
    }
}

impl fmt::Debug for BackupCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BackupCodes({} codes)", self.0.len())
    }
}
