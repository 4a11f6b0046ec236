//! Two-factor setup wizard
//!
//! Scan the secret, confirm a code, keep the backup codes.

use leptos::*;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use uvlhub_common::two_factor::BACKUP_CODES_NOTICE;
use uvlhub_common::WizardStep;

use crate::api::ApiClient;
use crate::browser::BrowserFileSaver;
use crate::config::PageConfig;
use crate::controllers::{EnrollmentWizard, WizardView};

/// Id of the JSON block carrying [`TwoFactorSetupData`]
pub const TWO_FACTOR_DATA_ID: &str = "two-factor-data";

/// Rendered by the server when it generates the TOTP secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorSetupData {
    pub verify_url: String,
    /// Image source for the provisioning QR code (usually a data URI)
    pub qr_code: String,
    pub secret: String,
}

#[derive(Clone, Copy)]
pub struct SignalWizardView {
    step: RwSignal<WizardStep>,
    code: RwSignal<String>,
    error: RwSignal<Option<String>>,
    submitting: RwSignal<bool>,
    backup_codes: RwSignal<Vec<String>>,
    code_input: NodeRef<html::Input>,
}

impl SignalWizardView {
    fn new() -> Self {
        Self {
            step: create_rw_signal(WizardStep::ShowSecret),
            code: create_rw_signal(String::new()),
            error: create_rw_signal(None),
            submitting: create_rw_signal(false),
            backup_codes: create_rw_signal(Vec::new()),
            code_input: create_node_ref::<html::Input>(),
        }
    }
}

impl WizardView for SignalWizardView {
    fn show_step(&self, step: WizardStep) {
        self.step.set(step);
    }

    fn focus_code_input(&self) {
        if let Some(input) = self.code_input.get_untracked() {
            let _ = input.focus();
        }
    }

    fn code_input(&self) -> String {
        self.code.get_untracked()
    }

    fn show_error(&self, message: &str) {
        self.error.set(Some(message.to_string()));
    }

    fn hide_error(&self) {
        self.error.set(None);
    }

    fn set_submitting(&self, submitting: bool) {
        self.submitting.set(submitting);
    }

    fn render_backup_codes(&self, codes: &[String]) {
        self.backup_codes.set(codes.to_vec());
    }
}

type Wizard = EnrollmentWizard<ApiClient, SignalWizardView, BrowserFileSaver>;

#[component]
pub fn TwoFactorSetup(
    data: TwoFactorSetupData,
    #[prop(optional)] config: Option<PageConfig>,
) -> impl IntoView {
    let config = config.unwrap_or_default();
    let state = SignalWizardView::new();
    let wizard: StoredValue<Rc<Wizard>> = store_value(Rc::new(EnrollmentWizard::new(
        ApiClient::new(&config),
        state,
        BrowserFileSaver,
        data.verify_url.clone(),
    )));

    let go_to = move |step: WizardStep| wizard.get_value().go_to_step(step);

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let wizard = wizard.get_value();
        spawn_local(async move {
            wizard.verify_code().await;
        });
    };

    let download = move |_: ev::MouseEvent| {
        if let Err(e) = wizard.get_value().download_codes() {
            logging::error!("backup code download failed: {}", e);
        }
    };

    let panel_display = move |step: WizardStep| move || {
        if state.step.get() == step { "block" } else { "none" }
    };

    let code_input_ref = state.code_input;
    view! {
        <div class="two-factor-setup">
            <ol class="wizard-steps">
                {WizardStep::ALL.into_iter().map(|step| view! {
                    <li
                        id={step.indicator_id()}
                        class="wizard-step"
                        class:active=move || state.step.get() == step
                    >
                        {match step {
                            WizardStep::ShowSecret => "Scan",
                            WizardStep::EnterCode => "Verify",
                            WizardStep::BackupCodes => "Backup codes",
                        }}
                    </li>
                }).collect_view()}
            </ol>

            <div id="step1" class="step-content" style:display=panel_display(WizardStep::ShowSecret)>
                <h3>"Scan the QR code"</h3>
                <p>"Scan this code with your authenticator app, or enter the secret manually."</p>
                <img class="qr-code" src={data.qr_code.clone()} alt="Two-factor QR code"/>
                <p>
                    "Secret: "
                    <code class="two-factor-secret">{data.secret.clone()}</code>
                </p>
                <button class="btn btn-primary" on:click=move |_| go_to(WizardStep::EnterCode)>
                    "Next"
                </button>
            </div>

            <div id="step2" class="step-content" style:display=panel_display(WizardStep::EnterCode)>
                <h3>"Enter the verification code"</h3>
                <form on:submit=on_submit>
                    <div class="mb-3">
                        <label for="token">"6-digit code"</label>
                        <input
                            id="token"
                            class="form-control"
                            type="text"
                            inputmode="numeric"
                            autocomplete="one-time-code"
                            maxlength="6"
                            node_ref=code_input_ref
                            prop:value=move || state.code.get()
                            on:input=move |ev| state.code.set(event_target_value(&ev))
                        />
                    </div>

                    <div
                        id="error-message"
                        class="alert alert-danger"
                        style:display=move || if state.error.with(Option::is_some) { "block" } else { "none" }
                    >
                        {move || state.error.get().unwrap_or_default()}
                    </div>

                    <button
                        type="button"
                        class="btn btn-secondary me-2"
                        on:click=move |_| go_to(WizardStep::ShowSecret)
                    >
                        "Back"
                    </button>
                    <button id="verify-btn" type="submit" class="btn btn-primary" disabled=move || state.submitting.get()>
                        {move || if state.submitting.get() {
                            view! { <span class="spinner-border spinner-border-sm" role="status"></span> }.into_view()
                        } else {
                            view! { <span>"Verify"</span> }.into_view()
                        }}
                    </button>
                </form>
            </div>

            <div id="step3" class="step-content" style:display=panel_display(WizardStep::BackupCodes)>
                <h3>"Save your backup codes"</h3>
                <p class="text-muted">{BACKUP_CODES_NOTICE}</p>
                <div id="backup-codes-list" class="row">
                    {move || state.backup_codes.get().into_iter().map(|code| view! {
                        <div class="col-md-6 mb-2">
                            <code class="fs-5">{code}</code>
                        </div>
                    }).collect_view()}
                </div>
                <button class="btn btn-outline-primary" on:click=download>
                    "Download codes"
                </button>
            </div>
        </div>
    }
}
