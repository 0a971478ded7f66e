//! Engine configuration

/// Tunable knobs for the transactional core
///
/// Carried by [`crate::OrderEngine`] and threaded into the components
/// that perform contended atomic updates.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bounded retry budget for contended row-level updates (stock
    /// decrement, coupon usage increment). After the budget is spent the
    /// operation surfaces the domain error for its path.
    pub max_conflict_retries: u32,
    /// Clear the customer's cart after a successful from-cart checkout
    pub clear_cart_on_checkout: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: 8,
            clear_cart_on_checkout: true,
        }
    }
}

impl EngineConfig {
    pub fn with_max_conflict_retries(mut self, retries: u32) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    pub fn with_clear_cart_on_checkout(mut self, clear: bool) -> Self {
        self.clear_cart_on_checkout = clear;
        self
    }
}
