//! Wiring of the console core.
//!
//! One [`SessionHandle`] is created here and handed to the store, the guard
//! (through the router) and the business API. Nothing else owns a session.

use std::sync::Arc;

use crate::api::{ApiClient, AuthApi, ConsoleApi, HttpAuthApi};
use crate::api::types::ApiError;
use crate::config::ConsoleConfig;
use crate::guard::{NavigationGuard, RouteWhitelist};
use crate::router::Router;
use crate::session::SessionHandle;
use crate::storage::CredentialPersistence;
use crate::store::SessionStore;

pub struct App {
    pub store: SessionStore,
    pub router: Router,
    pub api: ConsoleApi,
}

impl App {
    /// Build the HTTP-backed console from config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ConsoleConfig, storage: Arc<dyn CredentialPersistence>) -> Result<Self, ApiError> {
        let client = ApiClient::new(config)?;
        let auth: Arc<dyn AuthApi> = Arc::new(HttpAuthApi::new(client.clone()));
        Ok(Self::assemble(client, auth, storage))
    }

    /// Build the console around an arbitrary Auth API implementation.
    #[must_use]
    pub fn assemble(client: ApiClient, auth: Arc<dyn AuthApi>, storage: Arc<dyn CredentialPersistence>) -> Self {
        let session = SessionHandle::new();
        let store = SessionStore::new(session.clone(), auth, storage);
        let router = Router::new(NavigationGuard::new(session.clone(), RouteWhitelist::login_only()));
        let api = ConsoleApi::new(client, session);
        Self { store, router, api }
    }
}
