//! Storefront domain types and logic for Vitrine.
//!
//! This crate holds the pure, I/O-free core of the shop:
//!
//! - **Catalog**: products and paginated product listings
//! - **Cart**: per-user line items with merge-on-add semantics
//! - **Pricing**: checkout quote computation (subtotal, tax, shipping,
//!   per-unit surcharge redistribution)
//! - **Checkout**: transient contact/quote state held between "start
//!   checkout" and the payment provider's success callback
//! - **Order**: immutable purchase records with denormalized snapshots
//!
//! # Example
//!
//! ```rust
//! use vitrine_commerce::prelude::*;
//!
//! let mut cart = Cart::new();
//! let pen = ProductId::new("prod-1");
//! cart.add_or_increment(pen.clone()).unwrap();
//! cart.add_or_increment(pen.clone()).unwrap();
//! assert_eq!(cart.get(&pen).unwrap().quantity, 2);
//!
//! let items = vec![QuoteItem {
//!     name: "Fountain pen".into(),
//!     description: "Fine nib".into(),
//!     unit_price: Money::new(1000, Currency::INR),
//!     quantity: 2,
//! }];
//! let quote = compute_quote(&items, &PricingConfig::default()).unwrap();
//! assert_eq!(quote.final_payable.amount, 2000 + 240 + 500);
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod error;
pub mod ids;
pub mod money;
pub mod order;
pub mod pricing;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    pub use crate::catalog::{Product, ProductPage, DEFAULT_ITEMS_PER_PAGE};

    pub use crate::cart::{Cart, CartItem, MAX_QUANTITY_PER_ITEM};

    pub use crate::pricing::{
        compute_quote, PricingConfig, ProviderLineItem, Quote, QuoteItem,
    };

    pub use crate::checkout::{CheckoutDetails, ContactDetails};

    pub use crate::order::{Order, OrderItem, ProductSnapshot, Purchaser};
}
