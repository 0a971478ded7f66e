//! Cart manager
//!
//! Owns per-customer shopping cart state. Carts are a non-authoritative
//! staging area: no stock validation happens at add time (stock is
//! checked only at order creation). Repeated adds for the same product
//! merge into a quantity increment on the existing line.

use chrono::Utc;
use dashmap::DashMap;
use shared::error::{CoreError, CoreResult};
use shared::models::{Cart, CartItem};

/// Per-customer cart state with upsert-merge add semantics
///
/// All mutations for one customer run under that customer's map entry
/// lock, so two concurrent adds of quantity 1 for the same product yield
/// one line with quantity 2, never two lines or a lost update.
#[derive(Default)]
pub struct CartManager {
    carts: DashMap<String, Cart>,
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("carts", &self.carts.len())
            .finish()
    }
}

impl CartManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of a product to the customer's cart
    ///
    /// Creates the cart lazily on first add. An existing line for the
    /// product gets its quantity incremented and its timestamp
    /// refreshed; otherwise a new line is appended.
    pub fn add_item(&self, customer_id: &str, product_id: &str, quantity: u32) -> CoreResult<()> {
        if quantity == 0 {
            return Err(CoreError::InvalidQuantity(0));
        }

        let mut cart = self
            .carts
            .entry(customer_id.to_string())
            .or_insert_with(|| Cart::new(customer_id));

        let now = Utc::now();
        cart.updated_at = now;
        match cart.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity += quantity;
                item.updated_at = now;
            }
            None => cart.items.push(CartItem {
                product_id: product_id.to_string(),
                quantity,
                added_at: now,
                updated_at: now,
            }),
        }
        tracing::debug!(customer_id = %customer_id, product_id = %product_id, quantity, "cart item added");
        Ok(())
    }

    /// Overwrite the quantity of an existing cart line
    pub fn set_item_quantity(
        &self,
        customer_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> CoreResult<()> {
        if quantity == 0 {
            return Err(CoreError::InvalidQuantity(0));
        }
        let mut cart = self
            .carts
            .get_mut(customer_id)
            .ok_or_else(|| CoreError::CartNotFound(customer_id.to_string()))?;
        let now = Utc::now();
        let item = cart
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::CartItemNotFound(product_id.to_string()))?;
        item.quantity = quantity;
        item.updated_at = now;
        cart.updated_at = now;
        Ok(())
    }

    /// Remove a product's line from the customer's cart
    pub fn remove_item(&self, customer_id: &str, product_id: &str) -> CoreResult<()> {
        let mut cart = self
            .carts
            .get_mut(customer_id)
            .ok_or_else(|| CoreError::CartNotFound(customer_id.to_string()))?;
        let before = cart.items.len();
        cart.items.retain(|i| i.product_id != product_id);
        if cart.items.len() == before {
            return Err(CoreError::CartItemNotFound(product_id.to_string()));
        }
        cart.updated_at = Utc::now();
        Ok(())
    }

    /// Snapshot of the customer's cart lines, insertion-ordered
    ///
    /// A customer without a cart gets an empty list, not an error.
    pub fn get_cart(&self, customer_id: &str) -> Vec<CartItem> {
        self.carts
            .get(customer_id)
            .map(|c| c.items.clone())
            .unwrap_or_default()
    }

    /// Drop all lines from the customer's cart (no-op without a cart)
    pub fn clear_cart(&self, customer_id: &str) {
        if let Some(mut cart) = self.carts.get_mut(customer_id) {
            cart.items.clear();
            cart.updated_at = Utc::now();
            tracing::debug!(customer_id = %customer_id, "cart cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_add_creates_cart_lazily() {
        let carts = CartManager::new();
        assert!(carts.get_cart("cust-1").is_empty());
        carts.add_item("cust-1", "p1", 2).unwrap();
        let items = carts.get_cart("cust-1");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn test_add_merges_into_existing_line() {
        let carts = CartManager::new();
        carts.add_item("cust-1", "p1", 2).unwrap();
        carts.add_item("cust-1", "p1", 3).unwrap();
        let items = carts.get_cart("cust-1");
        assert_eq!(items.len(), 1, "one line per (cart, product)");
        assert_eq!(items[0].quantity, 5);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let carts = CartManager::new();
        assert!(matches!(
            carts.add_item("cust-1", "p1", 0),
            Err(CoreError::InvalidQuantity(0))
        ));
        assert!(carts.get_cart("cust-1").is_empty());
    }

    #[test]
    fn test_items_keep_insertion_order() {
        let carts = CartManager::new();
        carts.add_item("cust-1", "p2", 1).unwrap();
        carts.add_item("cust-1", "p1", 1).unwrap();
        carts.add_item("cust-1", "p2", 1).unwrap();
        let ids: Vec<_> = carts
            .get_cart("cust-1")
            .into_iter()
            .map(|i| i.product_id)
            .collect();
        assert_eq!(ids, vec!["p2".to_string(), "p1".to_string()]);
    }

    #[test]
    fn test_set_item_quantity_overwrites() {
        let carts = CartManager::new();
        carts.add_item("cust-1", "p1", 2).unwrap();
        carts.set_item_quantity("cust-1", "p1", 7).unwrap();
        assert_eq!(carts.get_cart("cust-1")[0].quantity, 7);
        assert!(matches!(
            carts.set_item_quantity("cust-1", "p1", 0),
            Err(CoreError::InvalidQuantity(0))
        ));
        assert!(matches!(
            carts.set_item_quantity("cust-1", "p9", 1),
            Err(CoreError::CartItemNotFound(_))
        ));
    }

    #[test]
    fn test_remove_item() {
        let carts = CartManager::new();
        carts.add_item("cust-1", "p1", 2).unwrap();
        carts.add_item("cust-1", "p2", 1).unwrap();
        carts.remove_item("cust-1", "p1").unwrap();
        let items = carts.get_cart("cust-1");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, "p2");
        assert!(matches!(
            carts.remove_item("cust-1", "p1"),
            Err(CoreError::CartItemNotFound(_))
        ));
        assert!(matches!(
            carts.remove_item("cust-2", "p1"),
            Err(CoreError::CartNotFound(_))
        ));
    }

    #[test]
    fn test_clear_cart() {
        let carts = CartManager::new();
        carts.add_item("cust-1", "p1", 2).unwrap();
        carts.clear_cart("cust-1");
        assert!(carts.get_cart("cust-1").is_empty());
        // Clearing a missing cart is a no-op
        carts.clear_cart("cust-2");
    }

    #[test]
    fn test_concurrent_adds_merge_without_lost_updates() {
        // 8 threads × 10 adds of quantity 1 for the same (customer,
        // product): final quantity is 80 on a single line.
        let carts = Arc::new(CartManager::new());
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..10 {
                        carts.add_item("cust-1", "p1", 1).unwrap();
                    }
                });
            }
        });
        let items = carts.get_cart("cust-1");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 80);
    }
}
