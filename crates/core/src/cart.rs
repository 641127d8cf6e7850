//! Shopping cart model.
//!
//! A cart is an ordered list of lines. A line is identified by the pair
//! `(product id, unit price)`: adding the same product at a different tier
//! price opens a second line instead of merging. Quantities never drop below
//! one through [`Cart::update_quantity`]; a line only leaves the cart through
//! [`Cart::remove`] or [`Cart::clear`]. No line grows past
//! [`MAX_LINE_QUANTITY`], the most an order accepts for one line.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderTotals, ProductId, ShippingPolicy};

/// Largest quantity a single cart or order line may hold.
pub const MAX_LINE_QUANTITY: u32 = 1000;

/// The product fields a cart line keeps, captured when it is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub image: Option<String>,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: ProductSnapshot,
    /// Unit price resolved when the line was added.
    pub price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    /// Whether this line is the entry for `(id, price)`.
    #[must_use]
    pub fn matches(&self, id: ProductId, price: Decimal) -> bool {
        self.product.id == id && self.price == price
    }

    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Client-session cart with an explicit mutation contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `product` at `price`.
    ///
    /// Increments the matching line if one exists, up to
    /// [`MAX_LINE_QUANTITY`], otherwise appends a new line with quantity 1.
    pub fn add(&mut self, product: ProductSnapshot, price: Decimal) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.matches(product.id, price))
        {
            line.quantity = line.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
            return;
        }
        self.lines.push(CartLine {
            product,
            price,
            quantity: 1,
        });
    }

    /// Remove the line for `(id, price)`. Returns whether a line was removed.
    pub fn remove(&mut self, id: ProductId, price: Decimal) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| !line.matches(id, price));
        self.lines.len() != before
    }

    /// Adjust the quantity of the line for `(id, price)` by `delta`, kept
    /// within `1..=MAX_LINE_QUANTITY`. Returns the new quantity, or `None` if
    /// there is no such line.
    pub fn update_quantity(&mut self, id: ProductId, price: Decimal, delta: i64) -> Option<u32> {
        let line = self.lines.iter_mut().find(|line| line.matches(id, price))?;
        let updated = i64::from(line.quantity)
            .saturating_add(delta)
            .clamp(1, i64::from(MAX_LINE_QUANTITY));
        line.quantity = u32::try_from(updated).unwrap_or(MAX_LINE_QUANTITY);
        Some(line.quantity)
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// `Σ price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Subtotal, shipping and total under `policy`.
    #[must_use]
    pub fn totals(&self, policy: &ShippingPolicy) -> OrderTotals {
        policy.totals(self.subtotal())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn product(id: i32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            image: None,
        }
    }

    #[test]
    fn test_add_same_id_and_price_merges() {
        let mut cart = Cart::new();
        cart.add(product(5), dec!(10));
        cart.add(product(5), dec!(10));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines().first().map(|l| l.quantity), Some(2));
    }

    #[test]
    fn test_add_same_id_different_price_is_new_line() {
        let mut cart = Cart::new();
        cart.add(product(5), dec!(10));
        cart.add(product(5), dec!(45));

        assert_eq!(cart.lines().len(), 2);
        assert!(cart.lines().iter().all(|l| l.quantity == 1));
    }

    #[test]
    fn test_update_quantity_floors_at_one() {
        let mut cart = Cart::new();
        cart.add(product(1), dec!(10));

        assert_eq!(cart.update_quantity(ProductId::new(1), dec!(10), -1), Some(1));
        assert_eq!(cart.update_quantity(ProductId::new(1), dec!(10), -50), Some(1));
        assert_eq!(cart.update_quantity(ProductId::new(1), dec!(10), 3), Some(4));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_quantity_is_capped() {
        let mut cart = Cart::new();
        cart.add(product(2), dec!(20));

        assert_eq!(
            cart.update_quantity(ProductId::new(2), dec!(20), 1500),
            Some(MAX_LINE_QUANTITY)
        );
        assert_eq!(
            cart.update_quantity(ProductId::new(2), dec!(20), i64::MAX),
            Some(MAX_LINE_QUANTITY)
        );

        cart.add(product(2), dec!(20));
        assert_eq!(cart.lines().first().map(|l| l.quantity), Some(MAX_LINE_QUANTITY));
        assert_eq!(cart.item_count(), u64::from(MAX_LINE_QUANTITY));
    }

    #[test]
    fn test_update_quantity_only_touches_matching_line() {
        let mut cart = Cart::new();
        cart.add(product(1), dec!(10));
        cart.add(product(1), dec!(25));

        assert_eq!(cart.update_quantity(ProductId::new(1), dec!(25), 2), Some(3));
        assert_eq!(cart.update_quantity(ProductId::new(1), dec!(99), 2), None);
        let quantities: Vec<u32> = cart.lines().iter().map(|l| l.quantity).collect();
        assert_eq!(quantities, vec![1, 3]);
    }

    #[test]
    fn test_remove_matches_id_and_price() {
        let mut cart = Cart::new();
        cart.add(product(1), dec!(10));
        cart.add(product(1), dec!(25));

        assert!(!cart.remove(ProductId::new(1), dec!(11)));
        assert!(cart.remove(ProductId::new(1), dec!(10)));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines().first().map(|l| l.price), Some(dec!(25)));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(product(1), dec!(10));
        cart.add(product(2), dec!(3));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }

    #[test]
    fn test_totals() {
        let policy = ShippingPolicy::default();
        let mut cart = Cart::new();
        cart.add(product(1), dec!(20));
        cart.add(product(1), dec!(20));
        cart.add(product(2), dec!(10));

        assert_eq!(cart.item_count(), 3);
        let totals = cart.totals(&policy);
        assert_eq!(totals.subtotal, dec!(50));
        assert_eq!(totals.shipping, dec!(15));
        assert_eq!(totals.total, dec!(65));
        assert_eq!(totals.total, totals.subtotal + totals.shipping);

        cart.update_quantity(ProductId::new(2), dec!(10), 5);
        let totals = cart.totals(&policy);
        assert_eq!(totals.subtotal, dec!(100));
        assert_eq!(totals.shipping, dec!(15));

        cart.add(product(3), dec!(1));
        let totals = cart.totals(&policy);
        assert_eq!(totals.subtotal, dec!(101));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, dec!(101));
    }
}
