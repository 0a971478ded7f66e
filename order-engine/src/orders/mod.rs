//! Order engine and stock reconciler
//!
//! `engine` drives order creation, totals, and the status state
//! machine; `stock` keeps `stock_quantity` consistent with order-item
//! mutations (reservation on create, restoration on cancel).

pub mod engine;
pub mod stock;

pub use engine::OrderEngine;
pub use stock::StockReconciler;
