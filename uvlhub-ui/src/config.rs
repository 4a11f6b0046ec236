//! Page-supplied configuration
//!
//! The server template owns every URL and tunable; the client reads them from
//! data attributes and JSON script blocks rather than hard-coding them.

use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use wasm_bindgen::JsValue;
use web_sys::Document;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const API_BASE_ATTR: &str = "data-api-base";
pub const REQUEST_TIMEOUT_ATTR: &str = "data-request-timeout-ms";
pub const VERIFY_URL_ATTR: &str = "data-verify-url";
pub const VERIFY_BUTTON_ID: &str = "verify-btn";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no document is available")]
    NoDocument,
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("element #{element} has no {attribute} attribute")]
    MissingAttribute { element: String, attribute: String },
    #[error("invalid request timeout {0:?} (expected milliseconds > 0)")]
    InvalidTimeout(String),
    #[error("invalid JSON in #{id}: {reason}")]
    InvalidData { id: String, reason: String },
}

impl From<ConfigError> for JsValue {
    fn from(error: ConfigError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    /// Prefix for the session endpoints; empty means same-origin relative paths
    pub api_base: String,
    pub request_timeout: Duration,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl PageConfig {
    pub fn from_attributes(
        api_base: Option<String>,
        timeout_ms: Option<String>,
    ) -> Result<Self, ConfigError> {
        let request_timeout = match timeout_ms {
            Some(raw) => parse_timeout(&raw)?,
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            api_base: api_base.unwrap_or_default(),
            request_timeout,
        })
    }

    /// Reads `data-api-base` and `data-request-timeout-ms` from `<body>`
    pub fn from_document(document: &Document) -> Result<Self, ConfigError> {
        match document.body() {
            Some(body) => Self::from_attributes(
                body.get_attribute(API_BASE_ATTR),
                body.get_attribute(REQUEST_TIMEOUT_ATTR),
            ),
            None => Ok(Self::default()),
        }
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

pub fn document() -> Result<Document, ConfigError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or(ConfigError::NoDocument)
}

/// Verification endpoint exposed by the submit button of the setup form
pub fn verify_url(document: &Document) -> Result<String, ConfigError> {
    let button = document
        .get_element_by_id(VERIFY_BUTTON_ID)
        .ok_or_else(|| ConfigError::MissingElement(VERIFY_BUTTON_ID.to_string()))?;

    button
        .get_attribute(VERIFY_URL_ATTR)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingAttribute {
            element: VERIFY_BUTTON_ID.to_string(),
            attribute: VERIFY_URL_ATTR.to_string(),
        })
}

/// Decodes a `<script type="application/json" id=...>` block
pub fn read_json_block<T: DeserializeOwned>(document: &Document, id: &str) -> Result<T, ConfigError> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| ConfigError::MissingElement(id.to_string()))?;
    let text = element.text_content().unwrap_or_default();
    parse_json_block(id, &text)
}

fn parse_json_block<T: DeserializeOwned>(id: &str, text: &str) -> Result<T, ConfigError> {
    serde_json::from_str(text).map_err(|e| ConfigError::InvalidData {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uvlhub_common::SessionInfo;

    #[test]
    fn test_defaults() {
        let config = PageConfig::from_attributes(None, None).unwrap();
        assert_eq!(config, PageConfig::default());
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert!(config.api_base.is_empty());
    }

    #[test]
    fn test_attributes_override_defaults() {
        let config = PageConfig::from_attributes(
            Some("https://hub.example.org".to_string()),
            Some(" 2500 ".to_string()),
        )
        .unwrap();

        assert_eq!(config.api_base, "https://hub.example.org");
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_invalid_timeouts_are_rejected() {
        for raw in ["0", "-5", "soon", ""] {
            let err = PageConfig::from_attributes(None, Some(raw.to_string())).unwrap_err();
            assert_eq!(err, ConfigError::InvalidTimeout(raw.to_string()));
        }
    }

    #[test]
    fn test_json_block_parsing() {
        let sessions: Vec<SessionInfo> = parse_json_block(
            "sessions-data",
            r#"[{
                "session_id": "a1",
                "created_at": "2025-03-01T08:00:00Z",
                "last_activity": "2025-03-01T08:05:00Z"
            }]"#,
        )
        .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, "a1");

        let err = parse_json_block::<Vec<SessionInfo>>("sessions-data", "not json").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidData { ref id, .. } if id == "sessions-data"));
    }
}
