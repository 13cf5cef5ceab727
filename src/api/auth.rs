//! Auth API — login, logout and profile endpoints.
//!
//! The session store talks to these endpoints only through the [`AuthApi`]
//! trait, so tests can script responses without a server.

use reqwest::Method;

use super::types::{ApiError, ApiResult, LoginForm, LoginPayload, UserInfo};
use super::{ApiClient, bearer_token};

pub const LOGIN_ENDPOINT: &str = "/login";
pub const LOGOUT_ENDPOINT: &str = "/logOut";
pub const USER_INFO_ENDPOINT: &str = "/userinfo";

/// Provider-neutral async trait for the Auth API. Enables mocking in tests.
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    /// Submit credentials. The envelope `code` tells success from rejection.
    async fn login(&self, form: &LoginForm) -> Result<ApiResult<LoginPayload>, ApiError>;

    /// Fetch the profile (roles, permissions) of the token's owner.
    async fn user_info(&self, token: &str) -> Result<ApiResult<UserInfo>, ApiError>;

    /// Ask the server to invalidate the session.
    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError>;
}

/// [`AuthApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: ApiClient,
}

impl HttpAuthApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, form: &LoginForm) -> Result<ApiResult<LoginPayload>, ApiError> {
        let (mut envelope, headers) = self
            .client
            .call::<LoginPayload, _>(Method::POST, LOGIN_ENDPOINT, None, Some(form))
            .await?;
        if let Some(payload) = envelope.data.as_mut() {
            if payload.token.as_deref().is_none_or(str::is_empty) {
                payload.token = bearer_token(&headers);
            }
        }
        Ok(envelope)
    }

    async fn user_info(&self, token: &str) -> Result<ApiResult<UserInfo>, ApiError> {
        let (envelope, _) = self
            .client
            .call::<UserInfo, ()>(Method::GET, USER_INFO_ENDPOINT, Some(token), None)
            .await?;
        Ok(envelope)
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), ApiError> {
        let raw = self
            .client
            .send::<()>(Method::GET, LOGOUT_ENDPOINT, token, None)
            .await?;
        if (200..300).contains(&raw.status) {
            Ok(())
        } else {
            Err(ApiError::Status { status: raw.status, body: raw.body })
        }
    }
}
