//! Password-reset tokens.

use serde::{Deserialize, Serialize};

/// A single-use password-reset token stored on the user record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResetToken {
    /// The token value sent by email.
    pub token: String,
    /// Unix timestamp when the token stops being accepted.
    pub expires_at: i64,
}

impl ResetToken {
    /// Reset links are valid for one hour.
    pub const TTL_SECS: i64 = 60 * 60;

    /// Generate a fresh token.
    pub fn generate() -> Self {
        Self {
            token: generate_token_string(),
            expires_at: current_timestamp() + Self::TTL_SECS,
        }
    }

    /// Check if the token has expired.
    pub fn is_expired(&self) -> bool {
        current_timestamp() > self.expires_at
    }

    /// Check a presented token value against this one, rejecting expired
    /// tokens.
    pub fn accepts(&self, presented: &str) -> bool {
        !self.is_expired() && constant_time_eq(self.token.as_bytes(), presented.as_bytes())
    }
}

/// Generate a cryptographically secure token string.
fn generate_token_string() -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation() {
        let token = ResetToken::generate();
        assert!(!token.is_expired());
        assert!(token.accepts(&token.token.clone()));
        assert!(!token.accepts("something-else"));
    }

    #[test]
    fn test_unique_tokens() {
        let t1 = ResetToken::generate();
        let t2 = ResetToken::generate();
        assert_ne!(t1.token, t2.token);
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut token = ResetToken::generate();
        token.expires_at = current_timestamp() - 1;
        assert!(token.is_expired());
        assert!(!token.accepts(&token.token.clone()));
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = ResetToken::generate();
        assert!(token
            .token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
