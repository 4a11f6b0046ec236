//! Common types and utilities shared between the uvlhub server contract and uvlhub-ui

pub mod sessions;
pub mod two_factor;

pub use sessions::{DeviceType, RevokeResponse, SessionInfo};
pub use two_factor::{
    BackupCodes, CodeError, StepError, VerificationCode, VerifyRequest, VerifyResponse,
    WizardStep,
};
