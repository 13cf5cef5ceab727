//! Session record for the current console user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Exactly one [`Session`] exists per process. It lives behind a
//! [`SessionHandle`] that is handed to both the session store (the only
//! writer) and the navigation guard (a reader). Writes swap in a complete
//! record in one assignment, so readers never observe a half-written mix.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

/// Where the session is in its login lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated,
    LoggedOut,
}

/// Identity and credential of the user currently signed in to the console.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Server-assigned user id; `None` while unauthenticated.
    pub user_id: Option<i64>,
    pub display_name: String,
    /// Opaque avatar reference (usually an image URL).
    pub avatar: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    #[serde(skip)]
    pub token: Option<String>,
    pub phase: SessionPhase,
}

impl Session {
    /// Empty session in the given lifecycle phase.
    #[must_use]
    pub fn cleared(phase: SessionPhase) -> Self {
        Self { phase, ..Self::default() }
    }

    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.user_id.is_some()
    }

    /// `true` when the record is either fully populated or fully cleared.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        match (self.user_id, &self.token) {
            (Some(_), Some(token)) => !token.is_empty(),
            (None, None) => {
                self.roles.is_empty()
                    && self.permissions.is_empty()
                    && self.display_name.is_empty()
                    && self.avatar.is_empty()
            }
            _ => false,
        }
    }

    /// Snapshot written to durable storage. `None` for a cleared session.
    #[must_use]
    pub fn to_stored(&self) -> Option<StoredSession> {
        let id = self.user_id?;
        let token = self.token.clone()?;
        Some(StoredSession {
            id,
            username: self.display_name.clone(),
            avatar: self.avatar.clone(),
            role_list: self.roles.clone(),
            permission_list: self.permissions.clone(),
            token,
        })
    }

    /// Rebuild a session from a stored snapshot. Snapshots without a usable
    /// token are rejected rather than partially restored.
    #[must_use]
    pub fn from_stored(stored: StoredSession) -> Option<Self> {
        if stored.token.is_empty() {
            return None;
        }
        Some(Self {
            user_id: Some(stored.id),
            display_name: stored.username,
            avatar: stored.avatar,
            roles: stored.role_list,
            permissions: stored.permission_list,
            token: Some(stored.token),
            phase: SessionPhase::Authenticated,
        })
    }
}

/// Persisted form of a populated session, kept under the `"user"` namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub role_list: Vec<String>,
    #[serde(default)]
    pub permission_list: Vec<String>,
    pub token: String,
}

/// Shared, explicitly-owned handle to the process session.
///
/// Cloning the handle shares the same record. Only the crate (the session
/// store) can write through it.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current record.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn is_recognized(&self) -> bool {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).is_recognized()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).phase
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).token.clone()
    }

    pub(crate) fn replace(&self, next: Session) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Update only the lifecycle marker; identity fields are left alone.
    pub(crate) fn set_phase(&self, phase: SessionPhase) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).phase = phase;
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
