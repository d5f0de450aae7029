//! Catalog types: products and paginated listings.

use crate::ids::{ProductId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Default page size for product listings.
pub const DEFAULT_ITEMS_PER_PAGE: u64 = 4;

/// A product in the catalog.
///
/// Products are read-only from the cart/order subsystem's point of view;
/// only catalog management mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price in minor units.
    pub price: Money,
    /// Description shown on the detail page.
    pub description: String,
    /// Reference to the product image.
    pub image_url: String,
    /// User that manages this product.
    pub owner: UserId,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Create a new product.
    pub fn new(
        title: impl Into<String>,
        price: Money,
        description: impl Into<String>,
        image_url: impl Into<String>,
        owner: UserId,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: ProductId::generate(),
            title: title.into(),
            price,
            description: description.into(),
            image_url: image_url.into(),
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether a user manages this product.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    /// Update the mutable fields, bumping `updated_at`.
    pub fn apply_edit(
        &mut self,
        title: impl Into<String>,
        price: Money,
        description: impl Into<String>,
        image_url: Option<String>,
    ) {
        self.title = title.into();
        self.price = price;
        self.description = description.into();
        if let Some(url) = image_url {
            self.image_url = url;
        }
        self.updated_at = current_timestamp();
    }
}

/// One page of a product listing, with the flags the listing view needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductPage {
    /// Products on this page.
    pub items: Vec<Product>,
    /// Total number of products across all pages.
    pub total: u64,
    /// Current page (1-indexed).
    pub page: u64,
    /// Page size.
    pub per_page: u64,
}

impl ProductPage {
    /// Last page number (at least 1).
    pub fn last_page(&self) -> u64 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    /// Whether a next page exists.
    pub fn has_next_page(&self) -> bool {
        self.page < self.last_page()
    }

    /// Whether a previous page exists.
    pub fn has_previous_page(&self) -> bool {
        self.page > 1
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
    use crate::money::Currency;

    fn product(title: &str) -> Product {
        Product::new(
            title,
            Money::new(1000, Currency::INR),
            "A product",
            "/images/p.png",
            UserId::new("user-1"),
        )
    }

    #[test]
    fn test_product_ownership() {
        let p = product("Pen");
        assert!(p.is_owned_by(&UserId::new("user-1")));
        assert!(!p.is_owned_by(&UserId::new("user-2")));
    }

    #[test]
    fn test_apply_edit_keeps_image_when_absent() {
        let mut p = product("Pen");
        p.apply_edit("Pencil", Money::new(500, Currency::INR), "Softer", None);
        assert_eq!(p.title, "Pencil");
        assert_eq!(p.image_url, "/images/p.png");

        p.apply_edit(
            "Pencil",
            Money::new(500, Currency::INR),
            "Softer",
            Some("/images/q.png".to_string()),
        );
        assert_eq!(p.image_url, "/images/q.png");
    }

    #[test]
    fn test_page_flags() {
        let page = ProductPage {
            items: vec![product("A")],
            total: 9,
            page: 2,
            per_page: 4,
        };
        assert_eq!(page.last_page(), 3);
        assert!(page.has_next_page());
        assert!(page.has_previous_page());

        let last = ProductPage {
            items: vec![],
            total: 9,
            page: 3,
            per_page: 4,
        };
        assert!(!last.has_next_page());
    }

    #[test]
    fn test_empty_listing_is_one_page() {
        let page = ProductPage {
            items: vec![],
            total: 0,
            page: 1,
            per_page: 4,
        };
        assert_eq!(page.last_page(), 1);
        assert!(!page.has_next_page());
        assert!(!page.has_previous_page());
    }
}
