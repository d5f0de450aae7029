//! Product persistence.

use crate::StoreError;
use async_trait::async_trait;
use tokio::sync::Mutex;
use vitrine_commerce::catalog::{Product, ProductPage};
use vitrine_commerce::ids::{ProductId, UserId};

/// Catalog document store.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product.
    async fn insert(&self, product: Product) -> Result<(), StoreError>;

    /// Find a product by id.
    async fn find(&self, id: &ProductId) -> Result<Option<Product>, StoreError>;

    /// One page of the catalog, 1-indexed, newest-first is not required;
    /// ordering must merely be stable across pages.
    async fn page(&self, page: u64, per_page: u64) -> Result<ProductPage, StoreError>;

    /// All products managed by a user.
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Product>, StoreError>;

    /// Replace an existing product.
    async fn update(&self, product: Product) -> Result<(), StoreError>;

    /// Delete a product.
    async fn delete(&self, id: &ProductId) -> Result<(), StoreError>;
}

/// In-memory product store. Keeps insertion order so pagination is
/// stable.
#[derive(Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
}

impl MemoryProductStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.lock().await;
        if products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::Duplicate(product.id.to_string()));
        }
        products.push(product);
        Ok(())
    }

    async fn find(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.lock().await;
        Ok(products.iter().find(|p| &p.id == id).cloned())
    }

    async fn page(&self, page: u64, per_page: u64) -> Result<ProductPage, StoreError> {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let products = self.products.lock().await;
        let total = products.len() as u64;
        let start = ((page - 1) * per_page) as usize;
        let items = products
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect();
        Ok(ProductPage {
            items,
            total,
            page,
            per_page,
        })
    }

    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Product>, StoreError> {
        let products = self.products.lock().await;
        Ok(products
            .iter()
            .filter(|p| p.is_owned_by(owner))
            .cloned()
            .collect())
    }

    async fn update(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.lock().await;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => {
                *slot = product;
                Ok(())
            }
            None => Err(StoreError::NotFound(product.id.to_string())),
        }
    }

    async fn delete(&self, id: &ProductId) -> Result<(), StoreError> {
        let mut products = self.products.lock().await;
        let len_before = products.len();
        products.retain(|p| &p.id != id);
        if products.len() == len_before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
