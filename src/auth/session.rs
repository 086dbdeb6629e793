//! Session trust context for CARLOT.
//!
//! The server-side record of "who is logged in". Each visitor is keyed by
//! an opaque session id carried in a cookie; the data behind that id lives
//! only in this process. A [`Session`] handle scopes all reads and writes
//! to one visitor's entry and exposes the explicit
//! `establish` / `current` / `clear` contract the flow controller uses.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info};
use uuid::Uuid;

use crate::db::{Role, User};

/// The identity recorded for an authenticated visitor.
///
/// Holds only what the views and the access-control gate need. Never the
/// credential hash, never the plaintext password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    /// Authenticated user id.
    pub user_id: i64,
    /// Display name for the navigation bar.
    pub username: String,
    /// Role for permission checks.
    pub role: Role,
}

/// Per-visitor session state.
#[derive(Debug, Default)]
struct SessionData {
    identity: Option<SessionIdentity>,
    csrf_token: Option<String>,
}

/// In-process store of all live sessions, keyed by session id.
///
/// Entries live until [`Session::clear`] removes them; there is no expiry
/// sweep, so anonymous traffic (crawlers, cookie-less clients) grows the
/// map until the process restarts. Session expiry is left to the
/// surrounding deployment.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionData>>,
}

impl SessionStore {
    /// Create an empty session store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh anonymous session and return its id.
    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .expect("session store lock")
            .insert(id.clone(), SessionData::default());
        debug!(session_id = %id, "Created session");
        id
    }

    /// Check whether a session id is known to the store.
    pub fn contains(&self, id: &str) -> bool {
        self.sessions
            .lock()
            .expect("session store lock")
            .contains_key(id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session store lock").len()
    }

    /// True when no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a handle scoped to one session id.
    pub fn session(self: &Arc<Self>, id: impl Into<String>) -> Session {
        Session {
            store: Arc::clone(self),
            id: id.into(),
        }
    }
}

/// Handle scoping session reads and writes to a single visitor.
#[derive(Debug, Clone)]
pub struct Session {
    store: Arc<SessionStore>,
    id: String,
}

impl Session {
    /// The opaque session id (the cookie value).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record the authenticated identity for this visitor.
    ///
    /// Called exactly once per successful login or registration.
    pub fn establish(&self, user: &User) {
        let identity = SessionIdentity {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        };

        let mut sessions = self.store.sessions.lock().expect("session store lock");
        sessions.entry(self.id.clone()).or_default().identity = Some(identity);

        info!(
            session_id = %self.id,
            user_id = user.id,
            "Session established"
        );
    }

    /// The current authenticated identity, if any.
    pub fn current(&self) -> Option<SessionIdentity> {
        let sessions = self.store.sessions.lock().expect("session store lock");
        sessions.get(&self.id).and_then(|d| d.identity.clone())
    }

    /// Destroy the entire server-side session state.
    ///
    /// After this, `current()` reports anonymous even if the same
    /// transport-level session id is presented on a later request.
    pub fn clear(&self) {
        let removed = self
            .store
            .sessions
            .lock()
            .expect("session store lock")
            .remove(&self.id);

        if let Some(data) = removed {
            info!(
                session_id = %self.id,
                user_id = data.identity.as_ref().map(|i| i.user_id),
                "Session cleared"
            );
        } else {
            debug!(session_id = %self.id, "Clear: session not found");
        }
    }

    /// Store a CSRF token on this session, replacing any previous one.
    pub(crate) fn set_csrf(&self, token: String) {
        let mut sessions = self.store.sessions.lock().expect("session store lock");
        sessions.entry(self.id.clone()).or_default().csrf_token = Some(token);
    }

    /// Take the stored CSRF token, consuming it.
    pub(crate) fn take_csrf(&self) -> Option<String> {
        let mut sessions = self.store.sessions.lock().expect("session store lock");
        sessions.get_mut(&self.id).and_then(|d| d.csrf_token.take())
    }
}
