//! Pricing tiers and unit-price resolution.
//!
//! A product may offer bundles such as "5 units for 60.00". Each bundle is a
//! [`PricingTier`]; the ordered list of them plus the base price forms the
//! product's [`PriceOptions`]. Picking a tier only changes the unit price put
//! in the cart, never the product itself.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Problems with a single tier or a serialized tier list.
#[derive(Debug, thiserror::Error)]
pub enum TierError {
    #[error("tier label cannot be empty")]
    EmptyLabel,
    #[error("tier '{0}' must have a quantity of at least 1")]
    InvalidQuantity(String),
    #[error("tier '{0}' must have a positive price")]
    InvalidPrice(String),
    #[error("duplicate tier label '{0}'")]
    DuplicateLabel(String),
    #[error("malformed tier list: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One named bundle/price option of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub label: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl PricingTier {
    /// Create a validated tier.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank label, a quantity below 1 or a price that
    /// is not positive.
    pub fn new(label: impl Into<String>, quantity: i32, price: Decimal) -> Result<Self, TierError> {
        let tier = Self {
            label: label.into().trim().to_owned(),
            quantity,
            price,
        };
        tier.validate()?;
        Ok(tier)
    }

    /// Check the tier invariants.
    ///
    /// # Errors
    ///
    /// See [`PricingTier::new`].
    pub fn validate(&self) -> Result<(), TierError> {
        if self.label.trim().is_empty() {
            return Err(TierError::EmptyLabel);
        }
        if self.quantity < 1 {
            return Err(TierError::InvalidQuantity(self.label.clone()));
        }
        if self.price <= Decimal::ZERO {
            return Err(TierError::InvalidPrice(self.label.clone()));
        }
        Ok(())
    }
}

/// Validate an ordered tier list: every tier valid and labels unique.
///
/// # Errors
///
/// Returns the first problem found.
pub fn validate_tiers(tiers: &[PricingTier]) -> Result<(), TierError> {
    for (i, tier) in tiers.iter().enumerate() {
        tier.validate()?;
        if tiers.iter().take(i).any(|t| t.label == tier.label) {
            return Err(TierError::DuplicateLabel(tier.label.clone()));
        }
    }
    Ok(())
}

/// Parse a serialized (JSON array) tier list, as found in exported catalogs.
///
/// Callers are expected to fail closed: on error, log and fall back to the
/// base price with no tiers.
///
/// # Errors
///
/// Returns [`TierError::Malformed`] for invalid JSON, or a validation error
/// for a structurally valid list with bad entries.
pub fn parse_tiers(raw: &str) -> Result<Vec<PricingTier>, TierError> {
    let tiers: Vec<PricingTier> = serde_json::from_str(raw)?;
    validate_tiers(&tiers)?;
    Ok(tiers)
}

/// The unit prices a product can be added to the cart at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceOptions {
    pub base_price: Decimal,
    pub tiers: Vec<PricingTier>,
}

impl PriceOptions {
    #[must_use]
    pub const fn new(base_price: Decimal, tiers: Vec<PricingTier>) -> Self {
        Self { base_price, tiers }
    }

    /// The tier selected when the customer has not picked one: the first.
    #[must_use]
    pub fn default_tier(&self) -> Option<&PricingTier> {
        self.tiers.first()
    }

    /// Unit price with no explicit selection: first tier, else base price.
    #[must_use]
    pub fn default_price(&self) -> Decimal {
        self.default_tier().map_or(self.base_price, |t| t.price)
    }

    /// Look up a tier by label.
    #[must_use]
    pub fn tier(&self, label: &str) -> Option<&PricingTier> {
        self.tiers.iter().find(|t| t.label == label)
    }

    /// Resolve the unit price for an optional tier label.
    ///
    /// `None` gives the default price; an unknown label gives `None`.
    #[must_use]
    pub fn resolve(&self, label: Option<&str>) -> Option<Decimal> {
        match label {
            None => Some(self.default_price()),
            Some(label) => self.tier(label).map(|t| t.price),
        }
    }

    /// Whether `price` is one of the unit prices this product is sold at.
    #[must_use]
    pub fn offers(&self, price: Decimal) -> bool {
        price == self.base_price || self.tiers.iter().any(|t| t.price == price)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn options() -> PriceOptions {
        PriceOptions::new(
            dec!(15),
            vec![
                PricingTier::new("1 pack", 1, dec!(15)).unwrap_or_else(|e| panic!("{e}")),
                PricingTier::new("5 packs", 5, dec!(60)).unwrap_or_else(|e| panic!("{e}")),
                PricingTier::new("10 packs", 10, dec!(90)).unwrap_or_else(|e| panic!("{e}")),
            ],
        )
    }

    #[test]
    fn test_default_is_first_tier() {
        let opts = options();
        assert_eq!(opts.default_price(), dec!(15));
        assert_eq!(opts.default_tier().map(|t| t.label.as_str()), Some("1 pack"));
    }

    #[test]
    fn test_default_without_tiers_is_base_price() {
        let opts = PriceOptions::new(dec!(22.50), Vec::new());
        assert_eq!(opts.default_price(), dec!(22.50));
        assert_eq!(opts.resolve(None), Some(dec!(22.50)));
        assert_eq!(opts.resolve(Some("5 packs")), None);
    }

    #[test]
    fn test_resolve_selected_tier() {
        let opts = options();
        assert_eq!(opts.resolve(Some("5 packs")), Some(dec!(60)));
        assert_eq!(opts.resolve(Some("3 packs")), None);
    }

    #[test]
    fn test_offers() {
        let opts = options();
        assert!(opts.offers(dec!(15)));
        assert!(opts.offers(dec!(90)));
        assert!(!opts.offers(dec!(1)));
    }

    #[test]
    fn test_tier_validation() {
        assert!(matches!(
            PricingTier::new("  ", 1, dec!(1)),
            Err(TierError::EmptyLabel)
        ));
        assert!(matches!(
            PricingTier::new("none", 0, dec!(1)),
            Err(TierError::InvalidQuantity(_))
        ));
        assert!(matches!(
            PricingTier::new("free", 1, Decimal::ZERO),
            Err(TierError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_parse_tiers() {
        let tiers = parse_tiers(
            r#"[{"label":"1 bag","quantity":1,"price":10},{"label":"3 bags","quantity":3,"price":20}]"#,
        )
        .unwrap_or_default();
        assert_eq!(tiers.len(), 2);
        assert_eq!(tiers.get(1).map(|t| t.price), Some(dec!(20)));
    }

    #[test]
    fn test_parse_tiers_fails_closed_on_garbage() {
        assert!(matches!(parse_tiers("1 Strip, 5 for 60"), Err(TierError::Malformed(_))));
        assert!(matches!(
            parse_tiers(r#"[{"label":"a","quantity":1,"price":5},{"label":"a","quantity":2,"price":9}]"#),
            Err(TierError::DuplicateLabel(_))
        ));
        assert!(matches!(
            parse_tiers(r#"[{"label":"a","quantity":-1,"price":5}]"#),
            Err(TierError::InvalidQuantity(_))
        ));
    }
}
