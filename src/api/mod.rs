//! HTTP collaborators of the console: the Auth API and the business
//! endpoints (alarms, monitors).
//!
//! DESIGN
//! ======
//! [`ApiClient`] owns the `reqwest` client, the base URL and the bearer-token
//! convention. Envelope parsing is a pure function ([`parse_envelope`]) so
//! status/body handling is testable without a server.
//!
//! ERROR HANDLING
//! ==============
//! 4xx answers that still carry an envelope are returned as envelopes, since
//! the server reports rejected credentials that way. 5xx answers and bodies
//! that do not parse surface as [`ApiError`] transport variants.

pub mod auth;
pub mod console;
pub mod types;

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{ConsoleConfig, HttpTimeouts};
pub use auth::{AuthApi, HttpAuthApi};
pub use console::ConsoleApi;
use types::{ApiError, ApiResult};

const BEARER_PREFIX: &str = "Bearer ";

/// Raw response pieces handed back to endpoint wrappers.
pub(crate) struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

/// Shared HTTP plumbing for every console endpoint.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from typed console config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ConsoleConfig) -> Result<Self, ApiError> {
        Self::with_timeouts(&config.base_url, config.timeouts)
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_timeouts(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn send<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<RawResponse, ApiError> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("{BEARER_PREFIX}{token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(RawResponse { status, headers, body })
    }

    /// Send a request and parse the envelope.
    pub(crate) async fn call<T, B>(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<(ApiResult<T>, HeaderMap), ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let raw = self.send(method, path, token, body).await?;
        let envelope = parse_envelope(raw.status, &raw.body)?;
        Ok((envelope, raw.headers))
    }
}

/// Interpret a response status and body as an envelope.
///
/// # Errors
///
/// Returns [`ApiError::Status`] for 5xx answers and for non-2xx answers
/// without an envelope, [`ApiError::Parse`] for 2xx bodies that do not parse.
pub fn parse_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<ApiResult<T>, ApiError> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()));
    }
    if (400..500).contains(&status) {
        if let Ok(envelope) = serde_json::from_str::<ApiResult<T>>(body) {
            return Ok(envelope);
        }
    }
    Err(ApiError::Status { status, body: body.to_owned() })
}

/// Extract a bearer token from response headers.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().unwrap_or_default().trim();
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();
    if token.is_empty() { None } else { Some(token.to_owned()) }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
