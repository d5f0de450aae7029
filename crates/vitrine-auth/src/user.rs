//! User records.

use crate::token::ResetToken;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use vitrine_commerce::cart::Cart;
use vitrine_commerce::ids::UserId;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Role {
    /// Regular customer.
    #[default]
    Customer,
    /// Store administrator, may manage the catalog.
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// A stored user document.
///
/// The cart is embedded here: it is owned by exactly one user and has no
/// life of its own. `cart_revision` guards cart writes; the store only
/// accepts an update carrying the revision the cart was read at, so two
/// racing mutations cannot silently drop one another's increment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// User ID.
    pub id: UserId,
    /// Email address, unique across users.
    pub email: String,
    /// Argon2 PHC hash of the password.
    pub password_hash: String,
    /// Authorization role.
    pub role: Role,
    /// Outstanding password-reset token, if one was requested.
    pub reset_token: Option<ResetToken>,
    /// The user's cart.
    pub cart: Cart,
    /// Revision counter for cart compare-and-swap.
    pub cart_revision: u64,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl UserRecord {
    /// Create a new customer record with an empty cart.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            id: UserId::generate(),
            email: email.into(),
            password_hash: password_hash.into(),
            role: Role::Customer,
            reset_token: None,
            cart: Cart::new(),
            cart_revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create with a specific role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Check if this user may manage the catalog.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Attach a password-reset token.
    pub fn set_reset_token(&mut self, token: ResetToken) {
        self.reset_token = Some(token);
        self.touch();
    }

    /// Drop the password-reset token (after use or on new password).
    pub fn clear_reset_token(&mut self) {
        self.reset_token = None;
        self.touch();
    }

    /// Replace the password hash.
    pub fn set_password_hash(&mut self, hash: impl Into<String>) {
        self.password_hash = hash.into();
        self.touch();
    }

    /// Bump the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = current_timestamp();
    }
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
    fn test_new_user_defaults() {
        let user = UserRecord::new("a@example.com", "$argon2$fake");
        assert_eq!(user.role, Role::Customer);
        assert!(!user.is_admin());
        assert!(user.cart.is_empty());
        assert_eq!(user.cart_revision, 0);
        assert!(user.reset_token.is_none());
    }

    #[test]
    fn test_admin_role() {
        let user = UserRecord::new("a@example.com", "h").with_role(Role::Admin);
        assert!(user.is_admin());
        assert_eq!(user.role.as_str(), "admin");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("customer".parse::<Role>(), Ok(Role::Customer));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_reset_token_lifecycle() {
        let mut user = UserRecord::new("a@example.com", "h");
        user.set_reset_token(ResetToken::generate());
        assert!(user.reset_token.is_some());
        user.clear_reset_token();
        assert!(user.reset_token.is_none());
    }
}
