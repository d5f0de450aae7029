//! Browser sessions.
//!
//! A session is a server-side record keyed by the id carried in the
//! session cookie. It holds login state, the CSRF token, a one-shot
//! flash message, and the transient checkout details between "start
//! checkout" and the provider's success callback.

use crate::AuthError;
use serde::{Deserialize, Serialize};
use vitrine_commerce::checkout::CheckoutDetails;
use vitrine_commerce::ids::UserId;

/// Session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new cryptographically secure session ID.
    pub fn generate() -> Self {
        Self(format!("sess_{}", random_url_safe(18)))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID, also the cookie value.
    pub id: SessionId,
    /// Whether a login has been completed on this session.
    pub logged_in: bool,
    /// The authenticated user, when logged in.
    pub user_id: Option<UserId>,
    /// CSRF token for form protection.
    pub csrf_token: String,
    /// One-shot message surfaced on the next response.
    pub flash: Option<String>,
    /// Checkout state held between start and confirm; expires on its
    /// own clock.
    pub checkout: Option<CheckoutDetails>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp when the session expires.
    pub expires_at: i64,
}

impl Session {
    /// Default session duration: 7 days.
    pub const DEFAULT_TTL_SECS: i64 = 7 * 24 * 60 * 60;

    /// Create a new anonymous session.
    pub fn anonymous() -> Self {
        let now = current_timestamp();
        Self {
            id: SessionId::generate(),
            logged_in: false,
            user_id: None,
            csrf_token: random_url_safe(24),
            flash: None,
            checkout: None,
            created_at: now,
            expires_at: now + Self::DEFAULT_TTL_SECS,
        }
    }

    /// Check if the session has expired.
    pub fn is_expired(&self) -> bool {
        current_timestamp() > self.expires_at
    }

    /// Mark the session as logged in for a user.
    ///
    /// The session id and CSRF token are regenerated so a pre-login
    /// cookie cannot be fixated onto the authenticated session.
    pub fn authenticate(&mut self, user_id: UserId) {
        self.id = SessionId::generate();
        self.logged_in = true;
        self.user_id = Some(user_id);
        self.regenerate_csrf();
    }

    /// Verify a presented CSRF token.
    pub fn verify_csrf(&self, token: &str) -> Result<(), AuthError> {
        if self.csrf_token == token {
            Ok(())
        } else {
            Err(AuthError::CsrfMismatch)
        }
    }

    /// Regenerate the CSRF token.
    pub fn regenerate_csrf(&mut self) {
        self.csrf_token = random_url_safe(24);
    }

    /// Queue a one-shot message for the next response.
    pub fn set_flash(&mut self, message: impl Into<String>) {
        self.flash = Some(message.into());
    }

    /// Take the queued flash message, leaving none behind.
    pub fn take_flash(&mut self) -> Option<String> {
        self.flash.take()
    }

    /// Store checkout details for the pending purchase.
    pub fn set_checkout(&mut self, details: CheckoutDetails) {
        self.checkout = Some(details);
    }

    /// Get the held checkout details if they are still fresh; expired
    /// details are dropped.
    pub fn valid_checkout(&mut self) -> Option<&CheckoutDetails> {
        if self.checkout.as_ref().is_some_and(|c| c.is_expired()) {
            self.checkout = None;
        }
        self.checkout.as_ref()
    }

    /// Discard the held checkout details.
    pub fn clear_checkout(&mut self) {
        self.checkout = None;
    }
}

/// Generate `len` random bytes as URL-safe base64.
fn random_url_safe(len: usize) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::RngCore;

    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
