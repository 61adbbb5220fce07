//! Client-side session: the access/refresh token pair and where it lives.
//!
//! The pipeline reads the session before every request and is the only
//! writer. Stores are injected as `Arc<dyn SessionStore>` so tests can use
//! [`MemorySessionStore`] while the CLI persists to disk with
//! [`FileSessionStore`].

mod file;

use std::sync::Mutex;

use taskboard_common::AuthTokens;

use crate::errors::SessionError;

pub use file::FileSessionStore;

/// An authenticated client state. Both tokens are always present together.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Same session with a new access token; the refresh token is kept
    /// unless the server rotated it.
    pub fn refreshed(&self, access_token: String, rotated_refresh: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token: rotated_refresh.unwrap_or_else(|| self.refresh_token.clone()),
        }
    }
}

impl From<AuthTokens> for Session {
    fn from(tokens: AuthTokens) -> Self {
        Self::new(tokens.access, tokens.refresh)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Persistent home of the current session.
pub trait SessionStore: Send + Sync {
    /// The stored session, or `None` when signed out.
    fn get(&self) -> Result<Option<Session>, SessionError>;

    /// Replace the stored session.
    fn set(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove both tokens. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), SessionError>;
}

/// In-process store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Result<Option<Session>, SessionError> {
        let guard = self.inner.lock().map_err(|_| SessionError::LockPoisoned)?;
        Ok(guard.clone())
    }

    fn set(&self, session: &Session) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().map_err(|_| SessionError::LockPoisoned)?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().map_err(|_| SessionError::LockPoisoned)?;
        *guard = None;
        Ok(())
    }
}
