//! Authentication errors.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// User already exists.
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),

    /// Session not found or expired.
    #[error("session not found or expired")]
    SessionExpired,

    /// Token invalid or expired.
    #[error("token invalid or expired")]
    InvalidToken,

    /// Password too weak.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// CSRF token mismatch.
    #[error("CSRF token mismatch")]
    CsrfMismatch,

    /// Insufficient permissions.
    #[error("insufficient permissions")]
    InsufficientPermissions,

    /// Internal error (hashing backend, serialization).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Check if this is an authentication failure the client can fix by
    /// logging in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::SessionExpired | AuthError::InvalidToken
        )
    }

    /// Check if this is a permission error.
    pub fn is_permission_error(&self) -> bool {
        matches!(self, AuthError::InsufficientPermissions)
    }
}
