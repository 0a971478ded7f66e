//! Order Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::coupon::AppliedCoupon;

/// Order status state machine
///
/// Directed edges only:
/// `PENDING -> {CONFIRMED, CANCELLED}`,
/// `CONFIRMED -> {PROCESSING, CANCELLED}`,
/// `PROCESSING -> {SHIPPED, CANCELLED}`,
/// `SHIPPED -> {DELIVERED, RETURNED}`,
/// `DELIVERED -> {RETURNED}`.
/// `CANCELLED` and `RETURNED` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl OrderStatus {
    /// True when this status admits an edge to `next`
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Processing)
                | (Confirmed, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
                | (Shipped, Returned)
                | (Delivered, Returned)
        )
    }

    /// Terminal statuses admit no outgoing edges
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Returned => "RETURNED",
        };
        write!(f, "{}", s)
    }
}

/// Order line item
///
/// Immutable after creation. `unit_price` is a snapshot of the catalog
/// price at order-creation time and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Product reference (String ID)
    pub product_id: String,
    pub quantity: u32,
    /// Price snapshot at creation time
    pub unit_price: Decimal,
    /// quantity × unit_price
    pub line_total: Decimal,
}

/// Order entity
///
/// Invariant: `total_amount = subtotal + tax_amount + shipping_cost
/// - discount_amount` and `subtotal = Σ line_total`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    /// Globally unique, assigned at creation, immutable
    pub order_number: String,
    pub customer_id: String,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    /// Address references (String IDs, address book is out of scope)
    pub billing_address_id: String,
    pub shipping_address_id: String,
    pub items: Vec<OrderItem>,
    pub coupons: Vec<AppliedCoupon>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item input for order creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: String,
    pub quantity: u32,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub items: Vec<OrderItemInput>,
    pub billing_address_id: String,
    pub shipping_address_id: String,
    pub coupon_code: Option<String>,
    pub tax_amount: Decimal,
    pub shipping_cost: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_edges_allowed() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(Delivered.can_transition_to(Returned));
    }

    #[test]
    fn test_cancellation_edges() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
    }

    #[test]
    fn test_no_backward_or_terminal_edges() {
        use OrderStatus::*;
        assert!(!Shipped.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Returned.can_transition_to(Delivered));
        assert!(!Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Returned.is_terminal());
        assert!(!OrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");
    }
}
