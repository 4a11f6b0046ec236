//! Active login sessions and the revocation payloads answered by the server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback shown when a failed revocation carries no error text
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Device class reported by the server's user-agent parser
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    /// Font Awesome icon class used by the session table
    pub fn icon_class(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "fa-mobile",
            DeviceType::Tablet => "fa-tablet",
            DeviceType::Desktop => "fa-laptop",
        }
    }
}

/// One login session as rendered into the sessions page.
///
/// The client never interprets these fields beyond display; the server owns
/// the session and decides what revocation means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub device_type: Option<DeviceType>,
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_current: bool,
}

impl SessionInfo {
    pub fn icon_class(&self) -> &'static str {
        self.device_type.unwrap_or_default().icon_class()
    }

    /// Sessions without an expiry never expire
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires| now > expires)
    }

    /// "Firefox on Linux" style label
    pub fn device_label(&self) -> String {
        match (self.browser.as_deref(), self.os.as_deref()) {
            (Some(browser), Some(os)) => format!("{} on {}", browser, os),
            (Some(browser), None) => browser.to_string(),
            (None, Some(os)) => os.to_string(),
            (None, None) => "Unknown device".to_string(),
        }
    }

    pub fn last_active_label(&self, now: DateTime<Utc>) -> String {
        format_last_active(self.last_activity, now)
    }
}

/// Coarse relative time since the last activity of a session
pub fn format_last_active(last_activity: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - last_activity).num_seconds();

    fn plural(n: i64, unit: &str) -> String {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    }

    if elapsed < 60 {
        // Also covers small clock skew between server and browser
        "just now".to_string()
    } else if elapsed < 3600 {
        plural(elapsed / 60, "minute")
    } else if elapsed < 86400 {
        plural(elapsed / 3600, "hour")
    } else {
        plural(elapsed / 86400, "day")
    }
}

/// Body of `POST /sessions/{id}/revoke` and `POST /sessions/revoke-all`.
///
/// Failures come back with a 4xx status and the same shape, so a missing
/// `success` field counts as failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RevokeResponse {
    pub fn failure_message(&self) -> &str {
        self.error
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or(UNKNOWN_ERROR)
    }
}
