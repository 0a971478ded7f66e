//! Coupon ledger
//!
//! Validates coupon codes against their validity window, usage limit and
//! minimum order amount, and records per-order application. The
//! usage-count increment is serialized per coupon so two checkouts
//! racing for the last unit of a limited coupon cannot both win.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::error::{CoreError, CoreResult};
use shared::models::{AppliedCoupon, Coupon, DiscountType};
use shared::money::round_money;

use dashmap::DashMap;

/// Coupon records plus the order-coupon link table
///
/// `record` performs a bounded optimistic compare-and-increment on
/// `used_count`; a retry budget spent on conflicts surfaces
/// `CouponExhausted`, which the caller cannot distinguish from genuine
/// exhaustion (accepted by the error contract).
pub struct CouponLedger {
    coupons: DashMap<String, Coupon>,
    /// code -> coupon id (codes are globally unique)
    code_index: DashMap<String, String>,
    /// (order_id, coupon_id) -> link row, unique per pair
    links: DashMap<(String, String), AppliedCoupon>,
    max_conflict_retries: u32,
}

impl std::fmt::Debug for CouponLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouponLedger")
            .field("coupons", &self.coupons.len())
            .field("links", &self.links.len())
            .finish()
    }
}

impl CouponLedger {
    pub fn new(max_conflict_retries: u32) -> Self {
        Self {
            coupons: DashMap::new(),
            code_index: DashMap::new(),
            links: DashMap::new(),
            max_conflict_retries,
        }
    }

    /// Register a coupon; fails with `DuplicateCouponCode` on code reuse
    pub fn insert_coupon(&self, coupon: Coupon) -> CoreResult<()> {
        // The code index entry lock is the serialization point for the
        // unique-code invariant.
        match self.code_index.entry(coupon.code.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(CoreError::DuplicateCouponCode(coupon.code))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(coupon.id.clone());
                self.coupons.insert(coupon.id.clone(), coupon);
                Ok(())
            }
        }
    }

    /// Current state of a coupon
    pub fn get_coupon(&self, coupon_id: &str) -> CoreResult<Coupon> {
        self.coupons
            .get(coupon_id)
            .map(|c| c.clone())
            .ok_or_else(|| CoreError::CouponNotFound(coupon_id.to_string()))
    }

    /// Validate a code against an order subtotal as of a given instant
    ///
    /// Returns the coupon and the discount it would apply. Does not
    /// mutate anything; the authoritative exhaustion check happens again
    /// inside [`Self::record`].
    pub fn validate(
        &self,
        code: &str,
        order_subtotal: Decimal,
        as_of: DateTime<Utc>,
    ) -> CoreResult<(Coupon, Decimal)> {
        let coupon = self
            .code_index
            .get(code)
            .and_then(|id| self.coupons.get(id.value()).map(|c| c.clone()))
            .filter(|c| c.is_active)
            .ok_or_else(|| CoreError::CouponNotFound(code.to_string()))?;

        if !coupon.is_valid_at(as_of) {
            return Err(CoreError::CouponExpired(code.to_string()));
        }
        if order_subtotal < coupon.minimum_order_amount {
            return Err(CoreError::CouponBelowMinimum {
                subtotal: order_subtotal.to_string(),
                minimum: coupon.minimum_order_amount.to_string(),
            });
        }
        if coupon.is_exhausted() {
            return Err(CoreError::CouponExhausted(code.to_string()));
        }

        let discount = Self::discount_for(&coupon, order_subtotal);
        Ok((coupon, discount))
    }

    /// Discount a coupon yields on a subtotal, rounded to 2 dp
    fn discount_for(coupon: &Coupon, order_subtotal: Decimal) -> Decimal {
        match coupon.discount_type {
            DiscountType::FixedAmount => coupon.discount_value.min(order_subtotal),
            DiscountType::Percentage => {
                let raw = order_subtotal * coupon.discount_value / Decimal::ONE_HUNDRED;
                let capped = match coupon.max_discount_amount {
                    Some(cap) => raw.min(cap),
                    None => raw,
                };
                round_money(capped)
            }
        }
    }

    /// Record the application of a coupon to an order
    ///
    /// Inserts the (order, coupon) link and atomically increments
    /// `used_count` against the usage limit. On any failure the link is
    /// not left behind.
    pub fn record(
        &self,
        order_id: &str,
        coupon_id: &str,
        discount_applied: Decimal,
    ) -> CoreResult<AppliedCoupon> {
        if !self.coupons.contains_key(coupon_id) {
            return Err(CoreError::CouponNotFound(coupon_id.to_string()));
        }

        let key = (order_id.to_string(), coupon_id.to_string());
        let link = AppliedCoupon {
            order_id: order_id.to_string(),
            coupon_id: coupon_id.to_string(),
            discount_applied,
            applied_at: Utc::now(),
        };
        match self.links.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(CoreError::DuplicateCoupon {
                    order_id: order_id.to_string(),
                    coupon_id: coupon_id.to_string(),
                });
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(link.clone());
            }
        }

        match self.try_increment_usage(coupon_id) {
            Ok(()) => {
                tracing::info!(
                    order_id = %order_id,
                    coupon_id = %coupon_id,
                    discount = %discount_applied,
                    "coupon recorded"
                );
                Ok(link)
            }
            Err(e) => {
                // Compensate: the link must not outlive a failed increment.
                self.links.remove(&key);
                Err(e)
            }
        }
    }

    /// Bounded optimistic compare-and-increment on `used_count`
    fn try_increment_usage(&self, coupon_id: &str) -> CoreResult<()> {
        for _ in 0..=self.max_conflict_retries {
            let observed = self
                .coupons
                .get(coupon_id)
                .map(|c| c.used_count)
                .ok_or_else(|| CoreError::CouponNotFound(coupon_id.to_string()))?;

            let mut coupon = self
                .coupons
                .get_mut(coupon_id)
                .ok_or_else(|| CoreError::CouponNotFound(coupon_id.to_string()))?;
            if coupon.used_count != observed {
                // Lost the race since the unlocked read; retry.
                continue;
            }
            if coupon.is_exhausted() {
                return Err(CoreError::CouponExhausted(coupon.code.clone()));
            }
            coupon.used_count += 1;
            return Ok(());
        }
        // Retry budget spent on conflicts; indistinguishable from
        // exhaustion for the caller.
        Err(CoreError::CouponExhausted(coupon_id.to_string()))
    }
}
