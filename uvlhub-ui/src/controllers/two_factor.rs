//! Two-factor enrollment wizard
//!
//! Step 1 shows the secret, step 2 verifies a code against the server and
//! step 3 reveals the backup codes returned by a successful verification.

use leptos::logging;
use std::cell::{Cell, RefCell};
use uvlhub_common::two_factor::BACKUP_CODES_FILENAME;
use uvlhub_common::{BackupCodes, CodeError, StepError, VerificationCode, WizardStep};

use super::{FileSaver, InFlight};
use crate::api::{ApiError, VerifyApi};
use crate::browser::BrowserError;

pub const RETRY_MESSAGE: &str = "An error occurred. Please try again.";

/// What the wizard shows
pub trait WizardView {
    /// Shows the step's panel, hides the others and moves the indicator
    fn show_step(&self, step: WizardStep);
    fn focus_code_input(&self);
    fn code_input(&self) -> String;
    fn show_error(&self, message: &str);
    fn hide_error(&self);
    /// Disables the submit control and swaps its label for a spinner
    fn set_submitting(&self, submitting: bool);
    /// Replaces the rendered list with `codes`
    fn render_backup_codes(&self, codes: &[String]);
}

/// Page-lifetime state of one enrollment
#[derive(Debug, Default)]
pub struct WizardState {
    current_step: Cell<WizardStep>,
    backup_codes: RefCell<BackupCodes>,
    verifying: Cell<bool>,
}

impl WizardState {
    pub fn current_step(&self) -> WizardStep {
        self.current_step.get()
    }

    pub fn backup_codes(&self) -> BackupCodes {
        self.backup_codes.borrow().clone()
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying.get()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Rejected locally, nothing was sent
    Invalid(CodeError),
    /// A verification is already in flight
    Busy,
    /// Moved to step 3 with this many backup codes
    Verified(usize),
    /// The server refused the code; carries the message shown
    Rejected(String),
    Failed(ApiError),
}

pub struct EnrollmentWizard<A, V, S> {
    api: A,
    view: V,
    saver: S,
    verify_url: String,
    state: WizardState,
}

impl<A, V, S> EnrollmentWizard<A, V, S>
where
    A: VerifyApi,
    V: WizardView,
    S: FileSaver,
{
    pub fn new(api: A, view: V, saver: S, verify_url: impl Into<String>) -> Self {
        Self {
            api,
            view,
            saver,
            verify_url: verify_url.into(),
            state: WizardState::default(),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Unconditional: back navigation is allowed whenever the page offers it
    pub fn go_to_step(&self, step: WizardStep) {
        self.state.current_step.set(step);
        self.view.show_step(step);
        if step == WizardStep::EnterCode {
            self.view.focus_code_input();
        }
    }

    pub fn go_to_step_number(&self, step: u8) -> Result<(), StepError> {
        let step = WizardStep::try_from(step)?;
        self.go_to_step(step);
        Ok(())
    }

    pub async fn verify_code(&self) -> VerifyOutcome {
        if self.state.is_verifying() {
            logging::warn!("verification ignored: one is already in flight");
            return VerifyOutcome::Busy;
        }

        let code = match VerificationCode::parse(&self.view.code_input()) {
            Ok(code) => code,
            Err(e) => {
                self.view.show_error(e.user_message());
                return VerifyOutcome::Invalid(e);
            }
        };

        let result = match InFlight::begin(&self.state.verifying) {
            Some(_in_flight) => {
                self.view.hide_error();
                self.view.set_submitting(true);
                self.api.verify_code(&self.verify_url, &code).await
            }
            None => return VerifyOutcome::Busy,
        };

        match result {
            Ok(response) if response.success => {
                let codes = BackupCodes::new(response.backup_codes.unwrap_or_default());
                let count = codes.len();
                logging::log!("two-factor verified, {} backup codes issued", count);

                *self.state.backup_codes.borrow_mut() = codes;
                self.display_backup_codes();
                self.go_to_step(WizardStep::BackupCodes);
                VerifyOutcome::Verified(count)
            }
            Ok(response) => {
                let message = response.failure_message().to_string();
                logging::warn!("verification rejected: {}", message);
                self.view.show_error(&message);
                self.view.set_submitting(false);
                VerifyOutcome::Rejected(message)
            }
            Err(e) => {
                logging::error!("verification request failed: {}", e);
                self.view.show_error(RETRY_MESSAGE);
                self.view.set_submitting(false);
                VerifyOutcome::Failed(e)
            }
        }
    }

    pub fn display_backup_codes(&self) {
        let codes = self.state.backup_codes.borrow();
        self.view.render_backup_codes(codes.as_slice());
    }

    /// Saves the codes as a text file. `Ok(false)` when there is nothing to
    /// save yet.
    pub fn download_codes(&self) -> Result<bool, BrowserError> {
        let document = self.state.backup_codes.borrow().to_document();
        match document {
            Some(document) => {
                self.saver.save_text(BACKUP_CODES_FILENAME, &document)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
