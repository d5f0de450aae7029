//! User persistence.

use crate::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use vitrine_auth::UserRecord;
use vitrine_commerce::cart::Cart;
use vitrine_commerce::ids::UserId;

/// User document store.
///
/// Emails are unique. Cart writes go through [`UserStore::update_cart`],
/// which is compare-and-swap on the record's `cart_revision`: a write
/// carrying a stale revision fails with [`StoreError::Conflict`] and the
/// caller re-reads and retries.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; fails on a duplicate email.
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError>;

    /// Find a user by id.
    async fn find(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError>;

    /// Find a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Find the user holding a given reset token value. Expiry is the
    /// caller's business; this is a plain lookup.
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Replace non-cart fields of an existing user (password, reset
    /// token, role). The stored cart and its revision are untouched.
    async fn update(&self, user: UserRecord) -> Result<(), StoreError>;

    /// Write the user's cart if `expected_revision` still matches,
    /// returning the new revision.
    async fn update_cart(
        &self,
        id: &UserId,
        cart: Cart,
        expected_revision: u64,
    ) -> Result<u64, StoreError>;
}

/// In-memory user store.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<UserId, UserRecord>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Duplicate(user.email.clone()));
        }
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn find(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| {
                u.reset_token
                    .as_ref()
                    .is_some_and(|t| t.token == token)
            })
            .cloned())
    }

    async fn update(&self, user: UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.lock().await;
        match users.get_mut(&user.id) {
            Some(stored) => {
                let cart = stored.cart.clone();
                let cart_revision = stored.cart_revision;
                *stored = user;
                stored.cart = cart;
                stored.cart_revision = cart_revision;
                Ok(())
            }
            None => Err(StoreError::NotFound(user.id.to_string())),
        }
    }

    async fn update_cart(
        &self,
        id: &UserId,
        cart: Cart,
        expected_revision: u64,
    ) -> Result<u64, StoreError> {
        let mut users = self.users.lock().await;
        let stored = users
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        if stored.cart_revision != expected_revision {
            return Err(StoreError::Conflict(format!(
                "cart revision {} expected {}",
                stored.cart_revision, expected_revision
            )));
        }
        stored.cart = cart;
        stored.cart_revision += 1;
        stored.touch();
        Ok(stored.cart_revision)
    }
}
