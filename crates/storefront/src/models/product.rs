//! Catalog response types.

use rust_decimal::Decimal;
use serde::Serialize;

use harbor_core::{Category, PricingTier, Product};

use super::review::Review;

/// A product with its reviews, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub reviews: Vec<Review>,
}

/// One entry of the category list.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryEntry {
    pub name: Category,
    /// Storefront page for the category.
    pub path: String,
}

impl From<Category> for CategoryEntry {
    fn from(name: Category) -> Self {
        Self {
            name,
            path: name.page_path(),
        }
    }
}

/// A catalog entry to be inserted, e.g. from the seed file.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: Category,
    /// Already validated, in display order.
    pub pricing_tiers: Vec<PricingTier>,
}
