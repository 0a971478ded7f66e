//! Coupon Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discount type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percentage,
    FixedAmount,
}

/// Coupon entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    pub id: String,
    /// Unique coupon code, case-sensitive
    pub code: String,
    pub discount_type: DiscountType,
    /// Percentage value (10 = 10%) or fixed amount depending on type
    pub discount_value: Decimal,
    pub minimum_order_amount: Decimal,
    /// Cap for percentage discounts; ignored for fixed amounts
    pub max_discount_amount: Option<Decimal>,
    /// None means unlimited uses
    pub usage_limit: Option<u32>,
    pub used_count: u32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Coupon {
    /// True when the validity window contains `as_of`
    pub fn is_valid_at(&self, as_of: DateTime<Utc>) -> bool {
        as_of >= self.starts_at && as_of <= self.ends_at
    }

    /// True when the usage limit (if any) is already reached
    pub fn is_exhausted(&self) -> bool {
        match self.usage_limit {
            Some(limit) => self.used_count >= limit,
            None => false,
        }
    }
}

/// Order-coupon link entity, unique per (order, coupon)
///
/// A coupon may be applied at most once per order. The recorded
/// `discount_applied` is the amount actually subtracted from that order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedCoupon {
    pub order_id: String,
    pub coupon_id: String,
    pub discount_applied: Decimal,
    pub applied_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn coupon(limit: Option<u32>, used: u32) -> Coupon {
        Coupon {
            id: "c1".to_string(),
            code: "SAVE10".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from_str("10").unwrap(),
            minimum_order_amount: Decimal::from_str("100").unwrap(),
            max_discount_amount: None,
            usage_limit: limit,
            used_count: used,
            starts_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ends_at: Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap(),
            is_active: true,
        }
    }

    #[test]
    fn test_validity_window_is_inclusive() {
        let c = coupon(None, 0);
        assert!(c.is_valid_at(c.starts_at));
        assert!(c.is_valid_at(c.ends_at));
        assert!(!c.is_valid_at(c.ends_at + chrono::Duration::seconds(1)));
        assert!(!c.is_valid_at(c.starts_at - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_exhaustion() {
        assert!(!coupon(None, 1_000_000).is_exhausted());
        assert!(!coupon(Some(5), 4).is_exhausted());
        assert!(coupon(Some(5), 5).is_exhausted());
    }
}
