//! Data models
//!
//! Entity types for the transactional core. All IDs are `String`
//! (UUID v4, or caller-assigned for seeded fixtures). Monetary fields
//! are `rust_decimal::Decimal`.

pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;

// Re-exports
pub use cart::*;
pub use coupon::*;
pub use order::*;
pub use product::*;
