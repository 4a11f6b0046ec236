//! Browser-backed dialogs, downloads and navigation

use leptos::logging;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url, Window};

use crate::controllers::{Dialogs, FileSaver};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    #[error("no window is available")]
    NoWindow,
    #[error("{0}")]
    Js(String),
}

impl From<JsValue> for BrowserError {
    fn from(value: JsValue) -> Self {
        BrowserError::Js(
            value
                .as_string()
                .unwrap_or_else(|| format!("{:?}", value)),
        )
    }
}

impl From<BrowserError> for JsValue {
    fn from(error: BrowserError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

pub fn window() -> Result<Window, BrowserError> {
    web_sys::window().ok_or(BrowserError::NoWindow)
}

/// Full page reload, letting the server render the current session list
pub fn reload_page() {
    let reloaded = window().and_then(|window| window.location().reload().map_err(BrowserError::from));
    if let Err(e) = reloaded {
        logging::error!("page reload failed: {}", e);
    }
}

/// `window.confirm` / `window.alert`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserDialogs;

impl Dialogs for BrowserDialogs {
    fn confirm(&self, message: &str) -> bool {
        // A window that cannot prompt counts as a refusal
        window()
            .and_then(|window| {
                window
                    .confirm_with_message(message)
                    .map_err(BrowserError::from)
            })
            .unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        let shown = window().and_then(|window| {
            window
                .alert_with_message(message)
                .map_err(BrowserError::from)
        });
        if let Err(e) = shown {
            logging::error!("alert failed ({}): {}", e, message);
        }
    }
}

/// Saves text through a temporary object URL and a clicked `<a download>`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserFileSaver;

impl FileSaver for BrowserFileSaver {
    fn save_text(&self, filename: &str, contents: &str) -> Result<(), BrowserError> {
        let document = window()?.document().ok_or(BrowserError::NoWindow)?;
        let body = document
            .body()
            .ok_or_else(|| BrowserError::Js("document has no body".to_string()))?;

        let options = BlobPropertyBag::new();
        options.set_type("text/plain");
        let parts = js_sys::Array::of1(&JsValue::from_str(contents));
        let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;

        let anchor = document
            .create_element("a")?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| BrowserError::Js("created element is not an anchor".to_string()))?;
        anchor.set_href(&url);
        anchor.set_download(filename);
        body.append_child(&anchor)?;
        anchor.click();
        anchor.remove();

        Url::revoke_object_url(&url)?;
        Ok(())
    }
}
