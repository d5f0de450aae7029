//! Application error type and HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use vitrine_auth::AuthError;
use vitrine_commerce::CommerceError;
use vitrine_store::StoreError;

/// Errors a handler can surface, mapped onto HTTP responses.
///
/// The mapping keeps two rules: transient failures never leak backend
/// detail (and never imply lost state, since carts and sessions are only
/// mutated after persistence succeeds), and authorization failures never
/// describe the resource they protect.
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad input; the client should fix the request, not retry it.
    #[error("{0}")]
    Validation(String),

    /// The resource does not exist.
    #[error("not found")]
    NotFound,

    /// No login on this session.
    #[error("login required")]
    NotLoggedIn,

    /// Logged in, but not allowed (ownership, role, CSRF).
    #[error("forbidden")]
    Forbidden,

    /// A backend hiccup; retrying may succeed and no state was lost.
    #[error("temporary failure, please retry")]
    Transient(String),

    /// A bug-class failure.
    #[error("internal error")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::NotLoggedIn => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Transient(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound => "Not found.".to_string(),
            AppError::NotLoggedIn => "Please log in first.".to_string(),
            AppError::Forbidden => "Forbidden.".to_string(),
            AppError::Transient(_) => "Something went wrong, please try again.".to_string(),
            AppError::Internal(_) => "Something went wrong.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Transient(detail) => {
                tracing::warn!(%detail, "transient failure surfaced to client");
            }
            AppError::Internal(detail) => {
                tracing::error!(%detail, "internal error surfaced to client");
            }
            _ => {}
        }
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

impl From<CommerceError> for AppError {
    fn from(e: CommerceError) -> Self {
        match e {
            CommerceError::ItemNotInCart(_) => AppError::NotFound,
            CommerceError::EmptyCart
            | CommerceError::InvalidQuantity(_)
            | CommerceError::QuantityExceedsLimit(_, _)
            | CommerceError::InvalidPrice(_)
            | CommerceError::Validation(_) => AppError::Validation(e.to_string()),
            CommerceError::CurrencyMismatch { .. } | CommerceError::Overflow => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => AppError::NotFound,
            StoreError::Duplicate(what) => {
                AppError::Validation(format!("already exists: {}", what))
            }
            StoreError::Conflict(_) | StoreError::Unavailable(_) => {
                AppError::Transient(e.to_string())
            }
            StoreError::Serialization(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => {
                AppError::Validation("Invalid email or password.".to_string())
            }
            AuthError::InvalidToken => {
                AppError::Validation("Invalid or expired link.".to_string())
            }
            AuthError::WeakPassword(msg) => AppError::Validation(msg),
            AuthError::UserAlreadyExists(_) => {
                AppError::Validation("E-mail exists already.".to_string())
            }
            AuthError::UserNotFound(_) => AppError::NotFound,
            AuthError::SessionExpired => AppError::NotLoggedIn,
            AuthError::CsrfMismatch | AuthError::InsufficientPermissions => AppError::Forbidden,
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NotLoggedIn.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Transient("db".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_transient_hides_detail() {
        let err = AppError::Transient("connection refused to 10.0.0.5".into());
        assert!(!err.public_message().contains("10.0.0.5"));
    }

    #[test]
    fn test_commerce_error_mapping() {
        assert!(matches!(
            AppError::from(CommerceError::EmptyCart),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(CommerceError::ItemNotInCart("p".into())),
            AppError::NotFound
        ));
    }

    #[test]
    fn test_store_error_mapping() {
        assert!(matches!(
            AppError::from(StoreError::Conflict("rev".into())),
            AppError::Transient(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::Duplicate("email".into())),
            AppError::Validation(_)
        ));
    }
}
