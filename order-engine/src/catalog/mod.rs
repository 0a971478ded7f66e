//! Catalog store boundary
//!
//! The catalog owns product records. This core only needs three things
//! from it: a point read, an atomic conditional stock decrement, and an
//! unconditional stock increment. The trait keeps the engine independent
//! of the storage engine; [`MemoryCatalog`] is the in-process
//! implementation used by the engine and the test suite.

use dashmap::DashMap;
use shared::error::{CoreError, CoreResult};
use shared::models::Product;

/// Storage boundary for product records
///
/// `conditional_decrement_stock` is the `UPDATE … SET qty = qty - n
/// WHERE qty >= n` analog: the check and the mutation are a single
/// atomic step, serialized per product.
pub trait CatalogStore: Send + Sync {
    /// Point read of a product record
    fn get_product(&self, id: &str) -> CoreResult<Product>;

    /// Atomically decrement stock by `amount` if sufficient stock
    /// remains, else fail with `InsufficientStock` without mutating
    fn conditional_decrement_stock(&self, id: &str, amount: u32) -> CoreResult<()>;

    /// Unconditionally increment stock by `amount` (reverses a prior
    /// equal-magnitude decrement; never fails for an existing product)
    fn increment_stock(&self, id: &str, amount: u32) -> CoreResult<()>;

    /// Register a new product; fails with `DuplicateProduct` on id reuse
    fn insert_product(&self, product: Product) -> CoreResult<()>;
}

/// In-memory catalog backed by a sharded map
///
/// The shard entry lock serializes the check-and-decrement per product,
/// which makes the stock counter linearizable: the lock is held only for
/// the single check-and-mutate step, never across a whole order.
#[derive(Default)]
pub struct MemoryCatalog {
    products: DashMap<String, Product>,
}

impl std::fmt::Debug for MemoryCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCatalog")
            .field("products", &self.products.len())
            .finish()
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl CatalogStore for MemoryCatalog {
    fn get_product(&self, id: &str) -> CoreResult<Product> {
        self.products
            .get(id)
            .map(|p| p.clone())
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))
    }

    fn conditional_decrement_stock(&self, id: &str, amount: u32) -> CoreResult<()> {
        let mut product = self
            .products
            .get_mut(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
        if product.stock_quantity < amount {
            return Err(CoreError::InsufficientStock {
                product_id: id.to_string(),
                requested: amount,
            });
        }
        product.stock_quantity -= amount;
        tracing::debug!(
            product_id = %id,
            amount,
            remaining = product.stock_quantity,
            "stock decremented"
        );
        Ok(())
    }

    fn increment_stock(&self, id: &str, amount: u32) -> CoreResult<()> {
        let mut product = self
            .products
            .get_mut(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;
        product.stock_quantity += amount;
        tracing::debug!(
            product_id = %id,
            amount,
            remaining = product.stock_quantity,
            "stock restored"
        );
        Ok(())
    }

    fn insert_product(&self, product: Product) -> CoreResult<()> {
        match self.products.entry(product.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(CoreError::DuplicateProduct(product.id))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(product);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;

    fn product(id: &str, stock: u32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: Decimal::from_str("10.00").unwrap(),
            stock_quantity: stock,
            reorder_level: 2,
            is_active: true,
        }
    }

    fn catalog_with(products: &[(&str, u32)]) -> MemoryCatalog {
        let catalog = MemoryCatalog::new();
        for (id, stock) in products {
            catalog.insert_product(product(id, *stock)).unwrap();
        }
        catalog
    }

    #[test]
    fn test_get_product() {
        let catalog = catalog_with(&[("p1", 5)]);
        let p = catalog.get_product("p1").unwrap();
        assert_eq!(p.stock_quantity, 5);
        assert!(matches!(
            catalog.get_product("missing"),
            Err(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let catalog = catalog_with(&[("p1", 5)]);
        assert!(matches!(
            catalog.insert_product(product("p1", 9)),
            Err(CoreError::DuplicateProduct(_))
        ));
        // Original record untouched
        assert_eq!(catalog.get_product("p1").unwrap().stock_quantity, 5);
    }

    #[test]
    fn test_conditional_decrement_success_and_shortfall() {
        let catalog = catalog_with(&[("p1", 5)]);
        catalog.conditional_decrement_stock("p1", 3).unwrap();
        assert_eq!(catalog.get_product("p1").unwrap().stock_quantity, 2);

        let err = catalog.conditional_decrement_stock("p1", 3).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { requested: 3, .. }));
        // Failed decrement mutates nothing
        assert_eq!(catalog.get_product("p1").unwrap().stock_quantity, 2);
    }

    #[test]
    fn test_decrement_to_exactly_zero() {
        let catalog = catalog_with(&[("p1", 4)]);
        catalog.conditional_decrement_stock("p1", 4).unwrap();
        assert_eq!(catalog.get_product("p1").unwrap().stock_quantity, 0);
    }

    #[test]
    fn test_increment_stock() {
        let catalog = catalog_with(&[("p1", 1)]);
        catalog.increment_stock("p1", 3).unwrap();
        assert_eq!(catalog.get_product("p1").unwrap().stock_quantity, 4);
        assert!(matches!(
            catalog.increment_stock("missing", 1),
            Err(CoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_decrements_never_oversell() {
        // 10 units of stock, 16 threads each requesting 1: exactly 10
        // succeed and final stock is 0.
        let catalog = Arc::new(catalog_with(&[("p1", 10)]));
        let successes = std::sync::atomic::AtomicU32::new(0);

        std::thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| {
                    if catalog.conditional_decrement_stock("p1", 1).is_ok() {
                        successes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    }
                });
            }
        });

        assert_eq!(successes.load(std::sync::atomic::Ordering::SeqCst), 10);
        assert_eq!(catalog.get_product("p1").unwrap().stock_quantity, 0);
    }
}
