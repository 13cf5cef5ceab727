//! Alarm and monitor endpoints.
//!
//! Thin wrappers: each call attaches the current session token, checks the
//! envelope and hands back the payload.

use reqwest::Method;
use serde_json::Value;

use super::ApiClient;
use super::types::{AlarmForm, ApiError, MonitorForm, PageResult};
use crate::session::SessionHandle;

pub(crate) fn alarm_list_endpoint(page: u32) -> String {
    format!("/alarmList/{page}")
}

pub(crate) fn monitor_list_endpoint(page: u32) -> String {
    format!("/monitorList/{page}")
}

pub const SUBMIT_MONITOR_ENDPOINT: &str = "/submitMonitorForm";
pub const UPDATE_MONITOR_ENDPOINT: &str = "/updateMonitorForm";

/// Business endpoints of the console, authenticated with the shared session.
#[derive(Debug, Clone)]
pub struct ConsoleApi {
    client: ApiClient,
    session: SessionHandle,
}

impl ConsoleApi {
    #[must_use]
    pub fn new(client: ApiClient, session: SessionHandle) -> Self {
        Self { client, session }
    }

    /// `GET /alarmList/{page}`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unsuccessful envelope.
    pub async fn alarm_list(&self, page: u32) -> Result<PageResult<AlarmForm>, ApiError> {
        self.get_page(&alarm_list_endpoint(page)).await
    }

    /// `GET /monitorList/{page}`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unsuccessful envelope.
    pub async fn monitor_list(&self, page: u32) -> Result<PageResult<MonitorForm>, ApiError> {
        self.get_page(&monitor_list_endpoint(page)).await
    }

    /// `POST /submitMonitorForm`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unsuccessful envelope.
    pub async fn submit_monitor_form(&self, form: &MonitorForm) -> Result<Value, ApiError> {
        self.post_form(SUBMIT_MONITOR_ENDPOINT, form).await
    }

    /// `POST /updateMonitorForm`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an unsuccessful envelope.
    pub async fn update_monitor_form(&self, form: &MonitorForm) -> Result<Value, ApiError> {
        self.post_form(UPDATE_MONITOR_ENDPOINT, form).await
    }

    async fn get_page<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<PageResult<T>, ApiError> {
        let token = self.session.token();
        let (envelope, _) = self
            .client
            .call::<PageResult<T>, ()>(Method::GET, path, token.as_deref(), None)
            .await?;
        Ok(envelope
            .into_data()?
            .unwrap_or_else(|| PageResult { record_list: Vec::new(), count: 0 }))
    }

    async fn post_form(&self, path: &str, form: &MonitorForm) -> Result<Value, ApiError> {
        let token = self.session.token();
        let (envelope, _) = self
            .client
            .call::<Value, _>(Method::POST, path, token.as_deref(), Some(form))
            .await?;
        tracing::debug!(path, code = envelope.code, "monitor form posted");
        Ok(envelope.into_data()?.unwrap_or(Value::Null))
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
