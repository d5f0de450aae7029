//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in storefront domain operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// A quote or order was requested for an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Item not in cart.
    #[error("item not in cart: {0}")]
    ItemNotInCart(String),

    /// Invalid quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed.
    #[error("quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Invalid price.
    #[error("invalid price: {0}")]
    InvalidPrice(i64),

    /// Currency mismatch.
    #[error("currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("arithmetic overflow in money calculation")]
    Overflow,

    /// Validation error on user-supplied input.
    #[error("validation error: {0}")]
    Validation(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::Validation(e.to_string())
    }
}
