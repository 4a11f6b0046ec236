//! API client for communicating with the uvlhub account endpoints

use futures::future::{select, Either};
use leptos::logging;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::pin::pin;
use std::time::Duration;
use thiserror::Error;
use uvlhub_common::{RevokeResponse, VerificationCode, VerifyRequest, VerifyResponse};

use crate::config::PageConfig;

pub const REVOKE_ALL_PATH: &str = "/sessions/revoke-all";

pub fn revoke_session_path(session_id: &str) -> String {
    format!("/sessions/{}/revoke", urlencoding::encode(session_id))
}

/// Transport-level failures. Server-reported failures are not errors here:
/// they arrive as a decoded payload with `success: false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    Network(String),
    #[error("invalid response: {0}")]
    Parse(String),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("could not encode request: {0}")]
    Serialize(String),
}

/// Session revocation endpoints
#[allow(async_fn_in_trait)]
pub trait SessionApi {
    async fn revoke_session(&self, session_id: &str) -> Result<RevokeResponse, ApiError>;
    async fn revoke_all_sessions(&self) -> Result<RevokeResponse, ApiError>;
}

/// Two-factor setup verification endpoint
#[allow(async_fn_in_trait)]
pub trait VerifyApi {
    async fn verify_code(
        &self,
        verify_url: &str,
        code: &VerificationCode,
    ) -> Result<VerifyResponse, ApiError>;
}

/// fetch-based client; every request is raced against the configured timeout
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &PageConfig) -> Self {
        Self {
            base: config.api_base.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        }
    }

    /// Session endpoints live under `api_base`; absolute URLs are left alone
    fn session_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base, path)
        }
    }

    /// The page hands over the complete verify route; `api_base` does not apply
    fn verify_endpoint<'a>(&self, verify_url: &'a str) -> &'a str {
        verify_url
    }

    /// POST helper. `url` is used as given. The body is decoded whatever the
    /// status code, because the account endpoints report failures as JSON
    /// with a 4xx status.
    pub async fn post_json<T, B>(&self, url: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        logging::log!("POST {}", url);

        let mut request =
            reqwasm::http::Request::post(url).header("Content-Type", "application/json");
        if let Some(body) = body {
            let json =
                serde_json::to_string(body).map_err(|e| ApiError::Serialize(e.to_string()))?;
            request = request.body(json);
        }

        // The body read shares the deadline with the send.
        let timer = gloo_timers::future::sleep(self.timeout);
        let (status, text) = with_timeout(self.timeout, timer, async move {
            let response = request
                .send()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?;
            Ok((status, text))
        })
        .await?;

        decode_body(status, &text)
    }
}

fn decode_body<T: DeserializeOwned>(status: u16, text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(format!("HTTP {}: {}", status, e)))
}

/// Resolves to `ApiError::Timeout(timeout)` if `timer` finishes first
async fn with_timeout<T, F, S>(timeout: Duration, timer: S, request: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
    S: Future,
{
    let request = pin!(request);
    let timer = pin!(timer);

    match select(request, timer).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => {
            logging::warn!("request abandoned after {:?}", timeout);
            Err(ApiError::Timeout(timeout))
        }
    }
}

impl SessionApi for ApiClient {
    async fn revoke_session(&self, session_id: &str) -> Result<RevokeResponse, ApiError> {
        self.post_json::<_, ()>(&self.session_url(&revoke_session_path(session_id)), None)
            .await
    }

    async fn revoke_all_sessions(&self) -> Result<RevokeResponse, ApiError> {
        self.post_json::<_, ()>(&self.session_url(REVOKE_ALL_PATH), None)
            .await
    }
}

impl VerifyApi for ApiClient {
    async fn verify_code(
        &self,
        verify_url: &str,
        code: &VerificationCode,
    ) -> Result<VerifyResponse, ApiError> {
        self.post_json(self.verify_endpoint(verify_url), Some(&VerifyRequest::from(code)))
            .await
    }
}
