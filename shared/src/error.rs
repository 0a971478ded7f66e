//! Unified error taxonomy for the transactional core
//!
//! Every fallible operation in the core surfaces one of these variants.
//! Each variant carries a stable string code for API payloads and logs.
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 6xxx: Product / stock errors
//! - 7xxx: Cart errors
//! - 8xxx: Coupon errors

use thiserror::Error;

use crate::models::order::OrderStatus;

/// Unified error type for the transactional core
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoreError {
    /// Quantity must be a positive integer
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    /// Order creation requires at least one line item
    #[error("order must contain at least one item")]
    EmptyOrder,

    /// Conditional stock decrement failed for a product
    #[error("insufficient stock for product {product_id}: requested {requested}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
    },

    /// Monetary inputs produce an inconsistent order total
    #[error("invalid order total: {0}")]
    InvalidOrderTotal(String),

    /// Coupon code unknown or inactive
    #[error("coupon not found: {0}")]
    CouponNotFound(String),

    /// Coupon outside its validity window
    #[error("coupon expired: {0}")]
    CouponExpired(String),

    /// Order subtotal below the coupon's minimum
    #[error("order subtotal {subtotal} below coupon minimum {minimum}")]
    CouponBelowMinimum { subtotal: String, minimum: String },

    /// Coupon usage limit reached
    #[error("coupon usage limit reached: {0}")]
    CouponExhausted(String),

    /// Coupon already applied to this order
    #[error("coupon {coupon_id} already applied to order {order_id}")]
    DuplicateCoupon { order_id: String, coupon_id: String },

    /// Status transition not on the order state machine graph
    #[error("invalid order status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Product not found in the catalog
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is not purchasable
    #[error("product is inactive: {0}")]
    ProductInactive(String),

    /// Product id already registered in the catalog
    #[error("product already exists: {0}")]
    DuplicateProduct(String),

    /// Coupon code already registered in the ledger
    #[error("coupon code already exists: {0}")]
    DuplicateCouponCode(String),

    /// Order not found
    #[error("order not found: {0}")]
    OrderNotFound(String),

    /// Cart not found for customer
    #[error("cart not found for customer: {0}")]
    CartNotFound(String),

    /// Cart has no item for the given product
    #[error("cart item not found: {0}")]
    CartItemNotFound(String),

    /// Internal invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Stable string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity(_) => "E0001",
            Self::Internal(_) => "E0002",
            Self::EmptyOrder => "E4001",
            Self::InvalidOrderTotal(_) => "E4002",
            Self::InvalidTransition { .. } => "E4003",
            Self::OrderNotFound(_) => "E4004",
            Self::InsufficientStock { .. } => "E6001",
            Self::ProductNotFound(_) => "E6002",
            Self::ProductInactive(_) => "E6003",
            Self::DuplicateProduct(_) => "E6004",
            Self::CartNotFound(_) => "E7001",
            Self::CartItemNotFound(_) => "E7002",
            Self::CouponNotFound(_) => "E8001",
            Self::CouponExpired(_) => "E8002",
            Self::CouponBelowMinimum { .. } => "E8003",
            Self::CouponExhausted(_) => "E8004",
            Self::DuplicateCoupon { .. } => "E8005",
            Self::DuplicateCouponCode(_) => "E8006",
        }
    }

    /// True for errors the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;
