//! Stock reconciler
//!
//! The reactive rule set invoked by the order engine to keep product
//! stock consistent with order-item mutations. Reservation happens
//! exactly once during order creation; restoration exactly once on the
//! first transition into CANCELLED.

use std::sync::Arc;

use shared::error::{CoreError, CoreResult};
use shared::models::OrderItem;

use crate::catalog::CatalogStore;

/// Reservation / restoration rules over the catalog's stock counters
///
/// Reservation is all-or-nothing: if any item's conditional decrement
/// fails, every decrement already applied for this order is reversed
/// before the error surfaces.
#[derive(Clone)]
pub struct StockReconciler {
    catalog: Arc<dyn CatalogStore>,
}

impl std::fmt::Debug for StockReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockReconciler").finish()
    }
}

impl StockReconciler {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// Atomically decrement each product's stock by its item quantity
    ///
    /// Items are processed in order; the first failure triggers
    /// compensating restoration of the already-reserved prefix and
    /// aborts with that item's error.
    pub fn reserve(&self, items: &[OrderItem]) -> CoreResult<()> {
        for (idx, item) in items.iter().enumerate() {
            if let Err(e) = self
                .catalog
                .conditional_decrement_stock(&item.product_id, item.quantity)
            {
                tracing::warn!(
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %e,
                    "reservation failed, compensating"
                );
                self.compensate(&items[..idx]);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Increment each product's stock by its item quantity
    ///
    /// Unconditional: it only ever reverses a prior decrement of the
    /// same magnitude, so no upper-bound check is needed. All product
    /// rows are verified to exist before the first increment so the
    /// operation cannot stop half-way.
    pub fn restore(&self, items: &[OrderItem]) -> CoreResult<()> {
        for item in items {
            self.catalog.get_product(&item.product_id)?;
        }
        for item in items {
            self.catalog.increment_stock(&item.product_id, item.quantity)?;
        }
        Ok(())
    }

    /// Reverse the decrements of an already-reserved prefix
    fn compensate(&self, reserved: &[OrderItem]) {
        for item in reserved {
            // The product row existed moments ago; a failure here is an
            // invariant violation worth a loud log, not a panic.
            if let Err(e) = self.catalog.increment_stock(&item.product_id, item.quantity) {
                tracing::error!(
                    product_id = %item.product_id,
                    quantity = item.quantity,
                    error = %e,
                    "compensating restoration failed"
                );
            }
        }
    }
}
