//! Money rounding helpers
//!
//! All monetary amounts in the core are `rust_decimal::Decimal`. Derived
//! amounts (line totals, percentage discounts, order totals) are rounded
//! to 2 decimal places, half-up.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounding strategy for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Round a derived monetary amount to 2 decimal places, half-up
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(dec("1.005")), dec("1.01"));
        assert_eq!(round_money(dec("1.004")), dec("1.00"));
        assert_eq!(round_money(dec("2.675")), dec("2.68"));
    }

    #[test]
    fn test_round_money_idempotent_on_two_places() {
        assert_eq!(round_money(dec("19.99")), dec("19.99"));
    }
}
