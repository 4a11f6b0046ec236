//! Views over the server-rendered templates
//!
//! Element ids and class names below are the contract with the sessions and
//! two-factor setup templates.

use leptos::logging;
use uvlhub_common::WizardStep;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement};

use crate::browser;
use crate::config::VERIFY_BUTTON_ID;
use crate::controllers::{SessionView, WizardView};

pub const SESSION_ROW_PREFIX: &str = "session-";
pub const SESSION_ROWS_SELECTOR: &str = "tbody";

pub const STEP_PANEL_SELECTOR: &str = ".step-content";
pub const STEP_INDICATOR_SELECTOR: &str = "[id$=\"-indicator\"]";
pub const TOKEN_INPUT_ID: &str = "token";
pub const ERROR_MESSAGE_ID: &str = "error-message";
pub const VERIFY_TEXT_ID: &str = "verify-btn-text";
pub const VERIFY_SPINNER_ID: &str = "verify-btn-spinner";
pub const BACKUP_CODES_LIST_ID: &str = "backup-codes-list";

fn set_display(element: &HtmlElement, value: &str) {
    if let Err(e) = element.style().set_property("display", value) {
        logging::warn!("could not set display on #{}: {:?}", element.id(), e);
    }
}

fn html_elements(document: &Document, selector: &str) -> Vec<HtmlElement> {
    let list = match document.query_selector_all(selector) {
        Ok(list) => list,
        Err(e) => {
            logging::warn!("bad selector {}: {:?}", selector, e);
            return Vec::new();
        }
    };

    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .collect()
}

/// Rows of the sessions table, one `<tr id="session-{id}">` per session
#[derive(Debug, Clone)]
pub struct DomSessionView {
    document: Document,
}

impl DomSessionView {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl SessionView for DomSessionView {
    fn remove_row(&self, session_id: &str) {
        let id = format!("{}{}", SESSION_ROW_PREFIX, session_id);
        match self.document.get_element_by_id(&id) {
            Some(row) => row.remove(),
            None => logging::warn!("no row #{} to remove", id),
        }
    }

    fn remaining_rows(&self) -> Option<usize> {
        self.document
            .query_selector(SESSION_ROWS_SELECTOR)
            .ok()
            .flatten()
            .map(|rows| rows.child_element_count() as usize)
    }

    fn reload(&self) {
        browser::reload_page();
    }
}

/// Panels `#step1`..`#step3`, indicators `#step{n}-indicator`, the `#token`
/// input and the `#verify-btn` submit control
#[derive(Debug, Clone)]
pub struct DomWizardView {
    document: Document,
}

impl DomWizardView {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    fn element(&self, id: &str) -> Option<Element> {
        let element = self.document.get_element_by_id(id);
        if element.is_none() {
            logging::warn!("element #{} missing from the setup page", id);
        }
        element
    }

    fn html_element(&self, id: &str) -> Option<HtmlElement> {
        self.element(id)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }
}

impl WizardView for DomWizardView {
    fn show_step(&self, step: WizardStep) {
        for panel in html_elements(&self.document, STEP_PANEL_SELECTOR) {
            set_display(&panel, "none");
        }
        for indicator in html_elements(&self.document, STEP_INDICATOR_SELECTOR) {
            if let Err(e) = indicator.class_list().remove_1("active") {
                logging::warn!("could not deactivate #{}: {:?}", indicator.id(), e);
            }
        }

        if let Some(panel) = self.html_element(&step.panel_id()) {
            set_display(&panel, "block");
        }
        if let Some(indicator) = self.element(&step.indicator_id()) {
            if let Err(e) = indicator.class_list().add_1("active") {
                logging::warn!("could not activate #{}: {:?}", indicator.id(), e);
            }
        }
    }

    fn focus_code_input(&self) {
        if let Some(input) = self.html_element(TOKEN_INPUT_ID) {
            if let Err(e) = input.focus() {
                logging::warn!("could not focus #{}: {:?}", TOKEN_INPUT_ID, e);
            }
        }
    }

    fn code_input(&self) -> String {
        self.element(TOKEN_INPUT_ID)
            .and_then(|element| element.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn show_error(&self, message: &str) {
        if let Some(error) = self.html_element(ERROR_MESSAGE_ID) {
            error.set_text_content(Some(message));
            set_display(&error, "block");
        }
    }

    fn hide_error(&self) {
        if let Some(error) = self.html_element(ERROR_MESSAGE_ID) {
            set_display(&error, "none");
        }
    }

    fn set_submitting(&self, submitting: bool) {
        if let Some(button) = self
            .element(VERIFY_BUTTON_ID)
            .and_then(|element| element.dyn_into::<HtmlButtonElement>().ok())
        {
            button.set_disabled(submitting);
        }
        if let Some(text) = self.html_element(VERIFY_TEXT_ID) {
            set_display(&text, if submitting { "none" } else { "inline" });
        }
        if let Some(spinner) = self.html_element(VERIFY_SPINNER_ID) {
            set_display(&spinner, if submitting { "inline-block" } else { "none" });
        }
    }

    fn render_backup_codes(&self, codes: &[String]) {
        let Some(list) = self.element(BACKUP_CODES_LIST_ID) else {
            return;
        };
        list.set_text_content(None);

        for code in codes {
            let rendered = self.document.create_element("div").and_then(|column| {
                column.set_class_name("col-md-6 mb-2");
                let code_element = self.document.create_element("code")?;
                code_element.set_class_name("fs-5");
                code_element.set_text_content(Some(code));
                column.append_child(&code_element)?;
                list.append_child(&column)
            });
            if let Err(e) = rendered {
                logging::error!("could not render backup code: {:?}", e);
                return;
            }
        }
    }
}
