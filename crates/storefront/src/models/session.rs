//! Session-related types.
//!
//! The cart lives in the session; nothing else about the visitor is kept.

use serde::Serialize;

use harbor_core::{Cart, CartLine, OrderTotals, ShippingPolicy};

/// Session keys.
pub mod keys {
    /// Key for the visitor's cart.
    pub const CART: &str = "cart";
}

/// The cart as returned to clients, with derived totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub item_count: u64,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, shipping: &ShippingPolicy) -> Self {
        Self {
            items: cart.lines().to_vec(),
            item_count: cart.item_count(),
            totals: cart.totals(shipping),
        }
    }
}
