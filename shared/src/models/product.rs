//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity
///
/// Owned by the catalog store. `stock_quantity` is mutated only through
/// the stock reconciler's reserve/restore operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit price, positive
    pub price: Decimal,
    pub stock_quantity: u32,
    /// Reorder threshold; stock at or below this level flags a reorder
    pub reorder_level: u32,
    pub is_active: bool,
}

impl Product {
    /// True when stock has fallen to or below the reorder threshold
    pub fn needs_reorder(&self) -> bool {
        self.stock_quantity <= self.reorder_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product(stock: u32, reorder: u32) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Widget".to_string(),
            price: Decimal::from_str("9.99").unwrap(),
            stock_quantity: stock,
            reorder_level: reorder,
            is_active: true,
        }
    }

    #[test]
    fn test_needs_reorder_at_threshold() {
        assert!(product(5, 5).needs_reorder());
        assert!(product(0, 5).needs_reorder());
        assert!(!product(6, 5).needs_reorder());
    }
}
