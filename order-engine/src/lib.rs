//! Transactional core of the storefront backend
//!
//! This crate owns the cross-entity consistency rules that fire around
//! order placement and cancellation:
//!
//! - **Catalog store** (`catalog`): product records with an atomic
//!   conditional stock decrement
//! - **Cart manager** (`carts`): per-customer carts with upsert-merge
//!   add semantics
//! - **Coupon ledger** (`coupons`): validation and serialized usage
//!   counting
//! - **Order engine** (`orders`): order creation, totals, the status
//!   state machine, and the stock reconciler that keeps
//!   `stock_quantity` consistent with order-item mutations
//!
//! All components are safe for concurrent use; the per-product stock
//! counter and per-coupon usage counter are linearizable.

pub mod carts;
pub mod catalog;
pub mod config;
pub mod coupons;
pub mod orders;

// Re-export public surface
pub use carts::CartManager;
pub use catalog::{CatalogStore, MemoryCatalog};
pub use config::EngineConfig;
pub use coupons::CouponLedger;
pub use orders::{OrderEngine, StockReconciler};
