//! Wire DTOs for the console HTTP API.
//!
//! DESIGN
//! ======
//! Every endpoint answers with the same envelope (`flag`, `code`, `msg`,
//! `data`). Fields are defaulted so a sparse envelope still parses; the
//! caller decides which of `flag`/`code` signals success for its endpoint.

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;

/// Status code the server uses for an accepted request.
pub const SUCCESS_CODE: i64 = 200;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by console API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("http request failed: {0}")]
    Request(String),

    /// The server answered with a non-success HTTP status and no usable envelope.
    #[error("server returned HTTP {status}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The envelope was well-formed but flagged as unsuccessful.
    #[error("server rejected request ({code}): {message}")]
    Rejected { code: i64, message: String },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_API_REQUEST",
            Self::Status { .. } => "E_API_STATUS",
            Self::Parse(_) => "E_API_PARSE",
            Self::Rejected { .. } => "E_API_REJECTED",
            Self::ClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// Common response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T> {
    #[serde(default)]
    pub flag: bool,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    /// Either success marker is accepted for general-purpose endpoints.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.flag || self.code == SUCCESS_CODE
    }

    /// Unwrap the payload of a successful envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the envelope is not successful.
    pub fn into_data(self) -> Result<Option<T>, ApiError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::Rejected { code: self.code, message: self.msg })
        }
    }
}

/// Paged list payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    #[serde(default = "Vec::new")]
    pub record_list: Vec<T>,
    #[serde(default)]
    pub count: u64,
}

// =============================================================================
// AUTH
// =============================================================================

/// Credentials posted to `/login`.
#[derive(Clone, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPayload {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    /// Session credential; filled from the `Authorization` header when the
    /// body does not carry one.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

/// Profile returned by `/userinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    #[serde(default)]
    pub role_list: Vec<String>,
    #[serde(default)]
    pub permission_list: Vec<String>,
    #[serde(default)]
    pub avatar: String,
}

// =============================================================================
// ALARMS & MONITORS
// =============================================================================

/// An alarm raised by a monitoring point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmForm {
    pub id: i64,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub threshold: f64,
    /// Snapshot image reference captured when the alarm fired.
    #[serde(default)]
    pub photo: String,
    /// Id of the monitor that raised the alarm.
    pub pid: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// A monitoring point configuration. Fields the console does not interpret
/// are carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub threshold: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
