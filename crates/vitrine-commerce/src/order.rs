//! Order types and materialization.
//!
//! An order is written once, at checkout completion, and never mutated.
//! It carries full copies of the purchased products and of the
//! purchaser's contact details, so later catalog edits or deletions
//! cannot rewrite purchase history.

use crate::catalog::Product;
use crate::checkout::ContactDetails;
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use crate::pricing::Quote;
use serde::{Deserialize, Serialize};

/// A denormalized copy of a product at purchase time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    /// Id of the product this was copied from.
    pub product_id: ProductId,
    /// Title at purchase time.
    pub title: String,
    /// Unit price at purchase time.
    pub price: Money,
    /// Description at purchase time.
    pub description: String,
    /// Image reference at purchase time.
    pub image_url: String,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            description: product.description.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

/// One purchased line: a product snapshot and the quantity bought.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// The product as it was when purchased.
    pub product: ProductSnapshot,
    /// Quantity purchased.
    pub quantity: i64,
}

/// Who bought the order, snapshotted from the checkout form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Purchaser {
    /// The purchasing account, for history queries.
    pub user_id: UserId,
    /// Contact email used for this purchase.
    pub email: String,
    /// Recipient name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
    /// Delivery address.
    pub address: String,
}

/// A completed purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Purchased lines with product snapshots.
    pub items: Vec<OrderItem>,
    /// Purchaser snapshot.
    pub purchaser: Purchaser,
    /// Subtotal at purchase time.
    pub subtotal: Money,
    /// Tax charged.
    pub tax: Money,
    /// Shipping charged.
    pub shipping: Money,
    /// Amount actually payable.
    pub grand_total: Money,
    /// Hosted checkout session id this order settles; unique per order.
    pub payment_ref: String,
    /// Unix timestamp of creation.
    pub created_at: i64,
}

impl Order {
    /// Materialize an order from cart contents and checkout state.
    ///
    /// `purchased` pairs each product (already resolved from the cart's
    /// references) with the quantity bought. Fails with
    /// [`CommerceError::EmptyCart`] when there is nothing to buy; the
    /// caller must not have cleared the cart yet.
    pub fn materialize(
        user_id: UserId,
        purchased: &[(Product, i64)],
        contact: &ContactDetails,
        quote: &Quote,
        payment_ref: impl Into<String>,
    ) -> Result<Self, CommerceError> {
        if purchased.is_empty() {
            return Err(CommerceError::EmptyCart);
        }
        for (_, quantity) in purchased {
            if *quantity < 1 {
                return Err(CommerceError::InvalidQuantity(*quantity));
            }
        }

        let items = purchased
            .iter()
            .map(|(product, quantity)| OrderItem {
                product: ProductSnapshot::from(product),
                quantity: *quantity,
            })
            .collect();

        Ok(Self {
            id: OrderId::generate(),
            items,
            purchaser: Purchaser {
                user_id,
                email: contact.email.clone(),
                name: contact.full_name.clone(),
                phone: contact.phone.clone(),
                address: contact.address.clone(),
            },
            subtotal: quote.subtotal,
            tax: quote.tax,
            shipping: quote.shipping,
            grand_total: quote.final_payable,
            payment_ref: payment_ref.into(),
            created_at: current_timestamp(),
        })
    }

    /// Total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Whether this order belongs to the given user.
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.purchaser.user_id == user
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
    use crate::pricing::{compute_quote, PricingConfig, QuoteItem};

    fn product(title: &str, price: i64) -> Product {
        Product::new(
            title,
            Money::new(price, Currency::INR),
            format!("{} description", title),
            "/images/p.png",
            UserId::new("seller-1"),
        )
    }

    fn contact() -> ContactDetails {
        ContactDetails {
            full_name: "Asha Rao".into(),
            phone: "9876500000".into(),
            address: "12 Hill Road, Bandra".into(),
            email: "asha@example.com".into(),
        }
    }

    fn quote_for(purchased: &[(Product, i64)]) -> Quote {
        let items: Vec<QuoteItem> = purchased
            .iter()
            .map(|(p, q)| QuoteItem {
                name: p.title.clone(),
                description: p.description.clone(),
                unit_price: p.price,
                quantity: *q,
            })
            .collect();
        compute_quote(&items, &PricingConfig::default()).unwrap()
    }

    #[test]
    fn test_materialize_snapshots_products() {
        let mut notebook = product("Notebook", 1000);
        let purchased = vec![(notebook.clone(), 2)];
        let quote = quote_for(&purchased);
        let order = Order::materialize(
            UserId::new("buyer-1"),
            &purchased,
            &contact(),
            &quote,
            "cs_1",
        )
        .unwrap();

        // Later product edits must not touch the order.
        notebook.title = "Renamed".into();
        assert_eq!(order.items[0].product.title, "Notebook");
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.grand_total.amount, 2000 + 240 + 500);
        assert_eq!(order.payment_ref, "cs_1");
    }

    #[test]
    fn test_materialize_uses_form_contact_not_profile() {
        let purchased = vec![(product("Pen", 500), 1)];
        let quote = quote_for(&purchased);
        let mut form = contact();
        form.email = "gift-recipient@example.com".into();
        let order =
            Order::materialize(UserId::new("buyer-1"), &purchased, &form, &quote, "cs_2").unwrap();
        assert_eq!(order.purchaser.email, "gift-recipient@example.com");
        assert_eq!(order.purchaser.user_id, UserId::new("buyer-1"));
    }

    #[test]
    fn test_materialize_empty_cart_fails() {
        let quote = quote_for(&[(product("Pen", 500), 1)]);
        assert!(matches!(
            Order::materialize(UserId::new("buyer-1"), &[], &contact(), &quote, "cs_3"),
            Err(CommerceError::EmptyCart)
        ));
    }

    #[test]
    fn test_ownership_check() {
        let purchased = vec![(product("Pen", 500), 1)];
        let quote = quote_for(&purchased);
        let order = Order::materialize(
            UserId::new("buyer-1"),
            &purchased,
            &contact(),
            &quote,
            "cs_4",
        )
        .unwrap();
        assert!(order.is_owned_by(&UserId::new("buyer-1")));
        assert!(!order.is_owned_by(&UserId::new("buyer-2")));
    }
}
