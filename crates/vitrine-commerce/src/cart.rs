//! Shopping cart state.
//!
//! A cart holds at most one entry per product; adding an existing product
//! merges into the entry's quantity. Decrementing a quantity-1 entry
//! removes it, so a zero-quantity entry is never retained.

use crate::error::CommerceError;
use crate::ids::ProductId;
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per cart entry.
pub const MAX_QUANTITY_PER_ITEM: i64 = 9999;

/// A line in the cart: a product reference and how many of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// The referenced product.
    pub product_id: ProductId,
    /// Quantity, always >= 1.
    pub quantity: i64,
}

/// A user's cart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Entries, at most one per product.
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Check if the cart has no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Number of distinct products.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Get the entry for a product, if present.
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Add one unit of a product: merge into an existing entry or insert
    /// a new one with quantity 1.
    pub fn add_or_increment(&mut self, product_id: ProductId) -> Result<(), CommerceError> {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            if item.quantity >= MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    item.quantity + 1,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }
            item.quantity += 1;
            return Ok(());
        }
        self.items.push(CartItem {
            product_id,
            quantity: 1,
        });
        Ok(())
    }

    /// Increase the quantity of an existing entry by one.
    ///
    /// A missing entry is an error, not a silent success.
    pub fn increment(&mut self, product_id: &ProductId) -> Result<(), CommerceError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| &i.product_id == product_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(product_id.to_string()))?;
        if item.quantity >= MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                item.quantity + 1,
                MAX_QUANTITY_PER_ITEM,
            ));
        }
        item.quantity += 1;
        Ok(())
    }

    /// Decrease the quantity of an existing entry by one; a quantity-1
    /// entry is removed entirely.
    pub fn decrement(&mut self, product_id: &ProductId) -> Result<(), CommerceError> {
        let pos = self
            .items
            .iter()
            .position(|i| &i.product_id == product_id)
            .ok_or_else(|| CommerceError::ItemNotInCart(product_id.to_string()))?;
        if self.items[pos].quantity > 1 {
            self.items[pos].quantity -= 1;
        } else {
            self.items.remove(pos);
        }
        Ok(())
    }

    /// Remove an entry regardless of quantity. No-op when absent.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.product_id != product_id);
        self.items.len() < len_before
    }

    /// Empty the cart. Used once per checkout, after the order has been
    /// durably persisted.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
