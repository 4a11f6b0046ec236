//! uvlhub account screens compiled to WebAssembly
//!
//! Session revocation and two-factor enrollment, usable either through the
//! handles bound to the server-rendered templates or as Leptos components.

use leptos::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

pub mod api;
pub mod browser;
pub mod config;
pub mod controllers;
pub mod dom;
pub mod handles;
pub mod pages;

use config::{ConfigError, PageConfig};
use pages::sessions::SESSIONS_DATA_ID;
use pages::two_factor::TWO_FACTOR_DATA_ID;
use pages::{SessionsPanel, TwoFactorSetup, TwoFactorSetupData};
use uvlhub_common::SessionInfo;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::log!("uvlhub-ui {} loaded", env!("CARGO_PKG_VERSION"));
}

fn host_element(document: &Document, host_id: &str) -> Result<HtmlElement, ConfigError> {
    document
        .get_element_by_id(host_id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| ConfigError::MissingElement(host_id.to_string()))
}

/// Renders the sessions panel into `#host_id` from the `#sessions-data` block
#[wasm_bindgen(js_name = mountSessionsPanel)]
pub fn mount_sessions_panel(host_id: &str) -> Result<(), JsValue> {
    let document = config::document()?;
    let config = PageConfig::from_document(&document)?;
    let sessions: Vec<SessionInfo> = config::read_json_block(&document, SESSIONS_DATA_ID)?;
    let host = host_element(&document, host_id)?;

    logging::log!("mounting sessions panel with {} sessions", sessions.len());
    mount_to(host, move || view! { <SessionsPanel sessions=sessions config=config/> });
    Ok(())
}

/// Renders the setup wizard into `#host_id` from the `#two-factor-data` block
#[wasm_bindgen(js_name = mountTwoFactorSetup)]
pub fn mount_two_factor_setup(host_id: &str) -> Result<(), JsValue> {
    let document = config::document()?;
    let config = PageConfig::from_document(&document)?;
    let data: TwoFactorSetupData = config::read_json_block(&document, TWO_FACTOR_DATA_ID)?;
    let host = host_element(&document, host_id)?;

    mount_to(host, move || view! { <TwoFactorSetup data=data config=config/> });
    Ok(())
}
