//! Session store — the only writer of the process [`Session`].
//!
//! ARCHITECTURE
//! ============
//! `login` → Auth API → (on code 200) persist snapshot → swap in session.
//! `fetch_profile` → Auth API with the stored token → swap in roles and
//! permissions. `logout` → Auth API → unconditional local reset.
//!
//! Every mutation builds the complete next record first, persists it, and
//! only then swaps it in. A failure anywhere before the swap leaves the
//! previous record in place.
//!
//! CONCURRENCY
//! ===========
//! Calls are not serialized. Two overlapping `login` calls race and the
//! last one to resolve wins. The lock inside [`SessionHandle`] is never held
//! across an `.await`.
//!
//! PROFILE POLICY
//! ==============
//! A profile answer with an unsuccessful flag keeps the current session and
//! returns [`SessionError::ProfileFetchIncomplete`]; the caller decides
//! whether that warrants a fresh login.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::AuthApi;
use crate::api::types::{ApiError, LoginForm, LoginPayload, SUCCESS_CODE, UserInfo};
use crate::error::ErrorCode;
use crate::session::{Session, SessionHandle, SessionPhase};
use crate::storage::{CredentialPersistence, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The server refused the credentials.
    #[error("login rejected: {message}")]
    AuthenticationRejected { message: String },

    /// The Auth API could not be reached or answered garbage.
    #[error("auth transport failed: {0}")]
    Transport(#[from] ApiError),

    /// The profile endpoint answered with an unsuccessful flag.
    #[error("profile fetch incomplete: {message}")]
    ProfileFetchIncomplete { message: String },

    /// A success answer lacked the fields needed to populate the session.
    #[error("malformed auth response: {0}")]
    MalformedResponse(String),

    /// The operation needs a signed-in session and there is none.
    #[error("no signed-in session")]
    NotRecognized,

    /// The session snapshot could not be persisted or cleared.
    #[error("credential storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::AuthenticationRejected { .. } => "E_AUTH_REJECTED",
            Self::Transport(_) => "E_AUTH_TRANSPORT",
            Self::ProfileFetchIncomplete { .. } => "E_PROFILE_INCOMPLETE",
            Self::MalformedResponse(_) => "E_AUTH_MALFORMED",
            Self::NotRecognized => "E_NOT_RECOGNIZED",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.retryable(),
            Self::ProfileFetchIncomplete { .. } => true,
            _ => false,
        }
    }
}

/// Owns login, profile and logout against the Auth API.
pub struct SessionStore {
    session: SessionHandle,
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn CredentialPersistence>,
}

impl SessionStore {
    #[must_use]
    pub fn new(session: SessionHandle, api: Arc<dyn AuthApi>, storage: Arc<dyn CredentialPersistence>) -> Self {
        Self { session, api, storage }
    }

    /// Handle to the session this store writes.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.session.is_recognized()
    }

    /// Restore the persisted snapshot, if any. Returns whether a user is
    /// recognized afterwards. A snapshot that cannot be restored in full is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be read or cleared. An
    /// unreadable snapshot is discarded, not reported.
    pub fn rehydrate(&self) -> Result<bool, SessionError> {
        let stored = match self.storage.load() {
            Ok(Some(stored)) => stored,
            Ok(None) => return Ok(self.session.is_recognized()),
            Err(e @ StorageError::Corrupt(_)) => {
                warn!(error = %e, "discarding unreadable stored session");
                self.storage.clear()?;
                return Ok(self.session.is_recognized());
            }
            Err(e) => return Err(e.into()),
        };
        let user_id = stored.id;
        if let Some(session) = Session::from_stored(stored) {
            self.session.replace(session);
            info!(user_id, "session rehydrated");
            return Ok(true);
        }
        warn!(user_id, "discarding stored session without a token");
        self.storage.clear()?;
        Ok(self.session.is_recognized())
    }

    /// Submit credentials and populate identity on success.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AuthenticationRejected`] when the answer code is not 200
    /// - [`SessionError::Transport`] when the Auth API is unreachable
    /// - [`SessionError::MalformedResponse`] when a success carries no payload or token
    /// - [`SessionError::Storage`] when the snapshot cannot be persisted
    ///
    /// The session is unchanged in every error case.
    pub async fn login(&self, form: &LoginForm) -> Result<LoginPayload, SessionError> {
        let prior_phase = self.session.phase();
        self.session.set_phase(SessionPhase::Authenticating);

        let result = self.try_login(form).await;
        if let Err(e) = &result {
            warn!(username = %form.username, error = %e, "login failed");
            if self.session.phase() == SessionPhase::Authenticating {
                self.session.set_phase(prior_phase);
            }
        }
        result
    }

    async fn try_login(&self, form: &LoginForm) -> Result<LoginPayload, SessionError> {
        let envelope = self.api.login(form).await?;
        if envelope.code != SUCCESS_CODE {
            return Err(SessionError::AuthenticationRejected { message: envelope.msg });
        }
        let payload = envelope
            .data
            .ok_or_else(|| SessionError::MalformedResponse("login answer has no payload".to_owned()))?;
        let token = payload
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SessionError::MalformedResponse("login answer carries no token".to_owned()))?;

        let current = self.session.snapshot();
        let (roles, permissions) = if current.user_id == Some(payload.id) {
            (current.roles, current.permissions)
        } else {
            (Vec::new(), Vec::new())
        };
        let next = Session {
            user_id: Some(payload.id),
            display_name: payload.username.clone(),
            avatar: payload.avatar.clone(),
            roles,
            permissions,
            token: Some(token),
            phase: SessionPhase::Authenticated,
        };
        self.commit(next)?;

        info!(user_id = payload.id, username = %payload.username, "login accepted");
        Ok(payload)
    }

    /// Load roles and permissions for the signed-in user.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotRecognized`] when no token is held, or the session
    ///   was replaced while the request was in flight
    /// - [`SessionError::Transport`] when the Auth API is unreachable
    /// - [`SessionError::ProfileFetchIncomplete`] when the answer flag is false
    /// - [`SessionError::MalformedResponse`] when a success carries no payload
    ///   or describes a different user than the session holds
    /// - [`SessionError::Storage`] when the snapshot cannot be persisted
    pub async fn fetch_profile(&self) -> Result<UserInfo, SessionError> {
        let token = self.session.token().ok_or(SessionError::NotRecognized)?;

        let envelope = self.api.user_info(&token).await.inspect_err(|e| {
            warn!(error = %e, "profile fetch failed");
        })?;
        if !envelope.flag {
            warn!(code = envelope.code, msg = %envelope.msg, "profile fetch incomplete; keeping current session");
            return Err(SessionError::ProfileFetchIncomplete { message: envelope.msg });
        }
        let info = envelope
            .data
            .ok_or_else(|| SessionError::MalformedResponse("profile answer has no payload".to_owned()))?;

        let current = self.session.snapshot();
        if current.token.as_deref() != Some(token.as_str()) {
            warn!("session changed during profile fetch; discarding profile");
            return Err(SessionError::NotRecognized);
        }
        if current.user_id != Some(info.id) {
            warn!(session_user = ?current.user_id, profile_user = info.id, "profile belongs to another user");
            return Err(SessionError::MalformedResponse(format!(
                "profile is for user {} but the session holds another user",
                info.id
            )));
        }
        let next = Session {
            user_id: Some(info.id),
            display_name: current.display_name,
            avatar: info.avatar.clone(),
            roles: info.role_list.clone(),
            permissions: info.permission_list.clone(),
            token: current.token,
            phase: SessionPhase::Authenticated,
        };
        self.commit(next)?;

        info!(user_id = info.id, roles = info.role_list.len(), "profile loaded");
        Ok(info)
    }

    /// Invalidate the session remotely and reset it locally.
    ///
    /// The local reset (memory and storage) happens whatever the remote call
    /// returns; a remote failure is reported afterwards.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Transport`] when the remote invalidation failed
    /// - [`SessionError::Storage`] when the stored snapshot could not be removed
    pub async fn logout(&self) -> Result<(), SessionError> {
        let token = self.session.token();
        let remote = self.api.logout(token.as_deref()).await;

        self.session.replace(Session::cleared(SessionPhase::LoggedOut));
        let cleared = self.storage.clear();

        if let Err(e) = remote {
            warn!(error = %e, "remote logout failed; local session cleared");
            if let Err(storage) = cleared {
                warn!(error = %storage, "stored session could not be removed");
            }
            return Err(SessionError::Transport(e));
        }
        cleared?;
        info!("logged out");
        Ok(())
    }

    fn commit(&self, next: Session) -> Result<(), SessionError> {
        match next.to_stored() {
            Some(stored) => self.storage.save(&stored)?,
            None => self.storage.clear()?,
        }
        self.session.replace(next);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
