//! Order persistence.

use crate::StoreError;
use async_trait::async_trait;
use tokio::sync::Mutex;
use vitrine_commerce::ids::{OrderId, UserId};
use vitrine_commerce::order::Order;

/// Order document store.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order.
    ///
    /// `payment_ref` is a uniqueness key: inserting a second order for
    /// the same hosted checkout session returns the order persisted
    /// first, unchanged. This is what makes a retried success callback
    /// produce exactly one order.
    async fn insert(&self, order: Order) -> Result<Order, StoreError>;

    /// Find an order by id.
    async fn find(&self, id: &OrderId) -> Result<Option<Order>, StoreError>;

    /// Find the order settling a hosted checkout session, if any.
    async fn find_by_payment_ref(&self, payment_ref: &str)
        -> Result<Option<Order>, StoreError>;

    /// All orders of a user, newest first.
    async fn find_by_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError>;
}

/// In-memory order store.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
}

impl MemoryOrderStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.lock().await;
        if let Some(existing) = orders.iter().find(|o| o.payment_ref == order.payment_ref) {
            return Ok(existing.clone());
        }
        orders.push(order.clone());
        Ok(order)
    }

    async fn find(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.lock().await.iter().find(|o| &o.id == id).cloned())
    }

    async fn find_by_payment_ref(
        &self,
        payment_ref: &str,
    ) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .await
            .iter()
            .find(|o| o.payment_ref == payment_ref)
            .cloned())
    }

    async fn find_by_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.lock().await;
        let mut mine: Vec<Order> = orders
            .iter()
            .filter(|o| o.is_owned_by(user))
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_commerce::catalog::Product;
    use vitrine_commerce::checkout::ContactDetails;
    use vitrine_commerce::money::{Currency, Money};
    use vitrine_commerce::pricing::{compute_quote, PricingConfig, QuoteItem};

    fn order_for(user: &str, payment_ref: &str) -> Order {
        let product = Product::new(
            "Pen",
            Money::new(500, Currency::INR),
            "desc",
            "/images/p.png",
            UserId::new("seller"),
        );
        let purchased = vec![(product, 1)];
        let items: Vec<QuoteItem> = purchased
            .iter()
            .map(|(p, q)| QuoteItem {
                name: p.title.clone(),
                description: p.description.clone(),
                unit_price: p.price,
                quantity: *q,
            })
            .collect();
        let quote = compute_quote(&items, &PricingConfig::default()).unwrap();
        let contact = ContactDetails {
            full_name: "Asha Rao".into(),
            phone: "9876500000".into(),
            address: "12 Hill Road".into(),
            email: "asha@example.com".into(),
        };
        Order::materialize(UserId::new(user), &purchased, &contact, &quote, payment_ref).unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_payment_ref_returns_original() {
        let store = MemoryOrderStore::new();
        let first = store.insert(order_for("u1", "cs_1")).await.unwrap();
        let second = store.insert(order_for("u1", "cs_1")).await.unwrap();
        assert_eq!(first.id, second.id);

        let all = store.find_by_user(&UserId::new("u1")).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_user_sorted_newest_first() {
        let store = MemoryOrderStore::new();
        let mut older = order_for("u1", "cs_1");
        older.created_at = 100;
        let mut newer = order_for("u1", "cs_2");
        newer.created_at = 200;
        store.insert(older).await.unwrap();
        store.insert(newer).await.unwrap();
        store.insert(order_for("u2", "cs_3")).await.unwrap();

        let mine = store.find_by_user(&UserId::new("u1")).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].payment_ref, "cs_2");
        assert_eq!(mine[1].payment_ref, "cs_1");
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let store = MemoryOrderStore::new();
        let order = store.insert(order_for("u1", "cs_1")).await.unwrap();
        assert!(store.find(&order.id).await.unwrap().is_some());
        assert!(store.find(&OrderId::new("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_payment_ref() {
        let store = MemoryOrderStore::new();
        let order = store.insert(order_for("u1", "cs_1")).await.unwrap();
        let found = store.find_by_payment_ref("cs_1").await.unwrap().unwrap();
        assert_eq!(found.id, order.id);
        assert!(store.find_by_payment_ref("cs_9").await.unwrap().is_none());
    }
}
