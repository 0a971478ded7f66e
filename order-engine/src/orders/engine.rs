//! Order engine - creation, totals, and the status state machine
//!
//! Order creation flow:
//!
//! ```text
//! create_order(req)
//!     ├─ 1. Validate items (non-empty, positive quantities) and fees
//!     ├─ 2. Snapshot unit prices from the catalog (active products only)
//!     ├─ 3. Reserve stock (all-or-nothing, compensated on abort)
//!     ├─ 4. Derive subtotal from line totals
//!     ├─ 5. Validate + record coupon (compensated on abort)
//!     ├─ 6. Derive total = subtotal + tax + shipping - discount
//!     ├─ 7. Persist order as PENDING with a unique order number
//!     └─ 8. Return the order snapshot
//! ```
//!
//! Status transitions follow the directed graph on
//! [`OrderStatus::can_transition_to`]; the first transition into
//! CANCELLED restores the reserved stock exactly once, under the order's
//! entry lock. Coupon usage is NOT reversed on cancellation - a
//! cancelled order's coupon use stays counted against the limit.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use shared::error::{CoreError, CoreResult};
use shared::models::{CreateOrderRequest, Order, OrderItem, OrderItemInput, OrderStatus};
use shared::money::round_money;

use crate::carts::CartManager;
use crate::catalog::CatalogStore;
use crate::config::EngineConfig;
use crate::coupons::CouponLedger;
use crate::orders::stock::StockReconciler;

/// Central order state machine over the catalog, carts and coupon ledger
pub struct OrderEngine {
    catalog: Arc<dyn CatalogStore>,
    carts: CartManager,
    coupons: CouponLedger,
    stock: StockReconciler,
    orders: DashMap<String, Order>,
    /// order_number -> order id (numbers are globally unique)
    number_index: DashMap<String, String>,
    /// Monotone counter feeding order number generation
    order_seq: AtomicU64,
    config: EngineConfig,
}

impl std::fmt::Debug for OrderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderEngine")
            .field("orders", &self.orders.len())
            .field("config", &self.config)
            .finish()
    }
}

impl OrderEngine {
    pub fn new(catalog: Arc<dyn CatalogStore>, config: EngineConfig) -> Self {
        let stock = StockReconciler::new(Arc::clone(&catalog));
        let coupons = CouponLedger::new(config.max_conflict_retries);
        Self {
            catalog,
            carts: CartManager::new(),
            coupons,
            stock,
            orders: DashMap::new(),
            number_index: DashMap::new(),
            order_seq: AtomicU64::new(0),
            config,
        }
    }

    /// Cart manager owned by this engine
    pub fn carts(&self) -> &CartManager {
        &self.carts
    }

    /// Coupon ledger owned by this engine
    pub fn coupons(&self) -> &CouponLedger {
        &self.coupons
    }

    /// Generate the next globally unique order number
    ///
    /// Date prefix plus a zero-offset monotone counter; uniqueness is
    /// guarded by the same atomic counter that generates it.
    fn next_order_number(&self) -> String {
        let seq = self.order_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let date_str = Utc::now().format("%Y%m%d").to_string();
        format!("ORD{}{}", date_str, 10000 + seq)
    }

    /// Create an order from explicit line items
    ///
    /// All-or-nothing: any item-level failure leaves no partial
    /// reservation behind. The order is persisted as PENDING.
    pub fn create_order(&self, req: CreateOrderRequest) -> CoreResult<Order> {
        if req.items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }
        for item in &req.items {
            if item.quantity == 0 {
                return Err(CoreError::InvalidQuantity(0));
            }
        }
        if req.tax_amount < Decimal::ZERO || req.shipping_cost < Decimal::ZERO {
            return Err(CoreError::InvalidOrderTotal(format!(
                "tax and shipping must be non-negative, got tax {} shipping {}",
                req.tax_amount, req.shipping_cost
            )));
        }

        // Snapshot unit prices. Catalog prices are immutable within this
        // core, so the snapshot cannot drift from the reservation below.
        let mut items = Vec::with_capacity(req.items.len());
        for input in &req.items {
            let product = self.catalog.get_product(&input.product_id)?;
            if !product.is_active {
                return Err(CoreError::ProductInactive(product.id));
            }
            let line_total = round_money(product.price * Decimal::from(input.quantity));
            items.push(OrderItem {
                product_id: input.product_id.clone(),
                quantity: input.quantity,
                unit_price: product.price,
                line_total,
            });
        }

        // Serializable reservation, compensated internally on abort.
        self.stock.reserve(&items)?;

        let subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
        let order_id = uuid::Uuid::new_v4().to_string();

        // From here on, any failure must give the stock back.
        let (discount_amount, applied) = match &req.coupon_code {
            Some(code) => {
                match self
                    .coupons
                    .validate(code, subtotal, Utc::now())
                    .and_then(|(coupon, discount)| {
                        self.coupons
                            .record(&order_id, &coupon.id, discount)
                            .map(|link| (discount, link))
                    }) {
                    Ok((discount, link)) => (discount, vec![link]),
                    Err(e) => {
                        if let Err(restore_err) = self.stock.restore(&items) {
                            tracing::error!(
                                order_id = %order_id,
                                error = %restore_err,
                                "restoration after coupon failure failed"
                            );
                        }
                        return Err(e);
                    }
                }
            }
            None => (Decimal::ZERO, Vec::new()),
        };

        // A discount overshooting subtotal plus fees clamps the total to
        // zero; it never goes negative.
        let total_amount =
            (subtotal + req.tax_amount + req.shipping_cost - discount_amount).max(Decimal::ZERO);

        let now = Utc::now();
        let order = Order {
            id: order_id.clone(),
            order_number: self.next_order_number(),
            customer_id: req.customer_id.clone(),
            status: OrderStatus::Pending,
            subtotal,
            tax_amount: req.tax_amount,
            shipping_cost: req.shipping_cost,
            discount_amount,
            total_amount,
            billing_address_id: req.billing_address_id.clone(),
            shipping_address_id: req.shipping_address_id.clone(),
            items,
            coupons: applied,
            created_at: now,
            updated_at: now,
        };

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            customer_id = %order.customer_id,
            total = %order.total_amount,
            "order created"
        );
        self.number_index
            .insert(order.order_number.clone(), order.id.clone());
        self.orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    /// Checkout: snapshot the customer's cart into an order
    ///
    /// The cart is cleared after a successful checkout when
    /// `clear_cart_on_checkout` is set.
    pub fn create_order_from_cart(
        &self,
        customer_id: &str,
        billing_address_id: &str,
        shipping_address_id: &str,
        coupon_code: Option<String>,
        tax_amount: Decimal,
        shipping_cost: Decimal,
    ) -> CoreResult<Order> {
        let items: Vec<OrderItemInput> = self
            .carts
            .get_cart(customer_id)
            .into_iter()
            .map(|i| OrderItemInput {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect();
        if items.is_empty() {
            return Err(CoreError::EmptyOrder);
        }

        let order = self.create_order(CreateOrderRequest {
            customer_id: customer_id.to_string(),
            items,
            billing_address_id: billing_address_id.to_string(),
            shipping_address_id: shipping_address_id.to_string(),
            coupon_code,
            tax_amount,
            shipping_cost,
        })?;

        if self.config.clear_cart_on_checkout {
            self.carts.clear_cart(customer_id);
        }
        Ok(order)
    }

    /// Drive an order along the status graph
    ///
    /// Cancelling an already-cancelled order is a no-op success so
    /// retries are tolerated. The first transition into CANCELLED
    /// restores the order's reserved stock, atomically with the status
    /// change under the order's entry lock. Coupon usage stays counted.
    pub fn transition_status(&self, order_id: &str, new_status: OrderStatus) -> CoreResult<Order> {
        let mut order = self
            .orders
            .get_mut(order_id)
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        if order.status == OrderStatus::Cancelled && new_status == OrderStatus::Cancelled {
            tracing::debug!(order_id = %order_id, "cancel retry ignored");
            return Ok(order.clone());
        }
        if !order.status.can_transition_to(new_status) {
            return Err(CoreError::InvalidTransition {
                from: order.status,
                to: new_status,
            });
        }

        if new_status == OrderStatus::Cancelled {
            // Restore before flipping the status: if restoration fails
            // the order stays in its current state and the caller can
            // retry the whole cancellation.
            self.stock.restore(&order.items)?;
            tracing::info!(
                order_id = %order_id,
                items = order.items.len(),
                "stock restored on cancellation"
            );
        }

        let from = order.status;
        order.status = new_status;
        order.updated_at = Utc::now();
        tracing::info!(order_id = %order_id, %from, to = %new_status, "order status changed");
        Ok(order.clone())
    }

    /// Cancel an order (idempotent at the boundary)
    pub fn cancel_order(&self, order_id: &str) -> CoreResult<Order> {
        self.transition_status(order_id, OrderStatus::Cancelled)
    }

    /// Point read of an order
    pub fn get_order(&self, order_id: &str) -> CoreResult<Order> {
        self.orders
            .get(order_id)
            .map(|o| o.clone())
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))
    }

    /// Look an order up by its public order number
    pub fn get_order_by_number(&self, order_number: &str) -> CoreResult<Order> {
        let id = self
            .number_index
            .get(order_number)
            .map(|id| id.clone())
            .ok_or_else(|| CoreError::OrderNotFound(order_number.to_string()))?;
        self.get_order(&id)
    }

    /// All of a customer's orders, oldest first
    pub fn list_orders_by_customer(&self, customer_id: &str) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.customer_id == customer_id)
            .map(|o| o.clone())
            .collect();
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.order_number.cmp(&b.order_number))
        });
        orders
    }
}
