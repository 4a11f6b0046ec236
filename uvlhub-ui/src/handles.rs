//! JavaScript entry points for the server-rendered pages
//!
//! ```js
//! const sessions = new SessionPanelHandle();
//! button.onclick = () => sessions.revokeSession(id);
//!
//! const wizard = new EnrollmentWizardHandle();
//! form.onsubmit = (event) => wizard.verifyCode(event);
//! ```

use leptos::spawn_local;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

use crate::api::ApiClient;
use crate::browser::{BrowserDialogs, BrowserFileSaver};
use crate::config::{self, PageConfig};
use crate::controllers::{EnrollmentWizard, SessionPanel};
use crate::dom::{DomSessionView, DomWizardView};

type DomSessionPanel = SessionPanel<ApiClient, DomSessionView, BrowserDialogs>;
type DomEnrollmentWizard = EnrollmentWizard<ApiClient, DomWizardView, BrowserFileSaver>;

/// Session revocation bound to the sessions template
#[wasm_bindgen]
pub struct SessionPanelHandle {
    panel: Rc<DomSessionPanel>,
}

#[wasm_bindgen]
impl SessionPanelHandle {
    #[wasm_bindgen(constructor)]
    pub fn attach() -> Result<SessionPanelHandle, JsValue> {
        let document = config::document()?;
        let config = PageConfig::from_document(&document)?;

        Ok(Self {
            panel: Rc::new(SessionPanel::new(
                ApiClient::new(&config),
                DomSessionView::new(document),
                BrowserDialogs,
            )),
        })
    }

    #[wasm_bindgen(js_name = revokeSession)]
    pub fn revoke_session(&self, session_id: String) {
        let panel = Rc::clone(&self.panel);
        spawn_local(async move {
            panel.revoke_session(&session_id).await;
        });
    }

    #[wasm_bindgen(js_name = revokeAllSessions)]
    pub fn revoke_all_sessions(&self) {
        let panel = Rc::clone(&self.panel);
        spawn_local(async move {
            panel.revoke_all_sessions().await;
        });
    }
}

/// Enrollment wizard bound to the two-factor setup template
#[wasm_bindgen]
pub struct EnrollmentWizardHandle {
    wizard: Rc<DomEnrollmentWizard>,
}

#[wasm_bindgen]
impl EnrollmentWizardHandle {
    #[wasm_bindgen(constructor)]
    pub fn attach() -> Result<EnrollmentWizardHandle, JsValue> {
        let document = config::document()?;
        let config = PageConfig::from_document(&document)?;
        let verify_url = config::verify_url(&document)?;

        Ok(Self {
            wizard: Rc::new(EnrollmentWizard::new(
                ApiClient::new(&config),
                DomWizardView::new(document),
                BrowserFileSaver,
                verify_url,
            )),
        })
    }

    #[wasm_bindgen(js_name = goToStep)]
    pub fn go_to_step(&self, step: u8) -> Result<(), JsValue> {
        self.wizard
            .go_to_step_number(step)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Submit handler of the code form; the page never navigates
    #[wasm_bindgen(js_name = verifyCode)]
    pub fn verify_code(&self, event: web_sys::Event) -> bool {
        event.prevent_default();
        let wizard = Rc::clone(&self.wizard);
        spawn_local(async move {
            wizard.verify_code().await;
        });
        false
    }

    #[wasm_bindgen(js_name = displayBackupCodes)]
    pub fn display_backup_codes(&self) {
        self.wizard.display_backup_codes();
    }

    /// Returns whether a file was produced
    #[wasm_bindgen(js_name = downloadCodes)]
    pub fn download_codes(&self) -> Result<bool, JsValue> {
        Ok(self.wizard.download_codes()?)
    }
}
