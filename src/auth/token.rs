//! CSRF token issuance and validation for CARLOT.
//!
//! Tokens are one-time use by policy: every rendered form gets a fresh
//! token, and validation consumes whatever token the session was holding.
//! A failed submission therefore re-renders with a new token, and a replay
//! of an already-checked token always fails.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

use super::session::Session;

/// Raw token size in bytes (256 bits of entropy).
pub const TOKEN_BYTES: usize = 32;

/// Issues and validates anti-forgery tokens bound to a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenManager;

impl TokenManager {
    /// Create a token manager.
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh token, store it on the session, and return it for
    /// embedding in the rendered form.
    pub fn issue(&self, session: &Session) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        let token = URL_SAFE_NO_PAD.encode(bytes);

        session.set_csrf(token.clone());
        token
    }

    /// Check a submitted token against the one stored on the session.
    ///
    /// Returns true iff a token was stored and the submitted value matches
    /// it under constant-time comparison. Always consumes the stored token.
    /// Missing, empty, or mismatched submissions return false; this never
    /// fails in a way the caller has to unwrap.
    pub fn validate(&self, session: &Session, submitted: &str) -> bool {
        let stored = match session.take_csrf() {
            Some(stored) => stored,
            None => return false,
        };

        if submitted.is_empty() {
            return false;
        }

        constant_time_eq(stored.as_bytes(), submitted.as_bytes())
    }
}

/// Byte-wise equality without data-dependent early exit.
///
/// The length check short-circuits, but token lengths are public (all
/// issued tokens encode the same 32 bytes); only the contents must not
/// leak through timing.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
