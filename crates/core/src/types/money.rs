//! Shipping and order totals using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Flat-fee shipping that is waived above a subtotal threshold.
///
/// Shipping is free only when the subtotal is strictly greater than
/// `free_threshold`; a subtotal exactly at the threshold still pays the fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    /// Subtotal that must be exceeded for free shipping.
    pub free_threshold: Decimal,
    /// Fee charged otherwise.
    pub flat_fee: Decimal,
}

impl ShippingPolicy {
    /// Create a shipping policy.
    #[must_use]
    pub const fn new(free_threshold: Decimal, flat_fee: Decimal) -> Self {
        Self {
            free_threshold,
            flat_fee,
        }
    }

    /// Shipping charged for a subtotal.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal > self.free_threshold {
            Decimal::ZERO
        } else {
            self.flat_fee
        }
    }

    /// Full breakdown for a subtotal.
    #[must_use]
    pub fn totals(&self, subtotal: Decimal) -> OrderTotals {
        let shipping = self.shipping_for(subtotal);
        OrderTotals {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

impl Default for ShippingPolicy {
    /// Free shipping over 100, otherwise a flat 15.
    fn default() -> Self {
        Self::new(Decimal::ONE_HUNDRED, Decimal::new(15, 0))
    }
}

/// Subtotal, shipping and total of a cart or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}
