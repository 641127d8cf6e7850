//! Catalog product records and list filtering.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::ProductSnapshot;
use crate::pricing::{PriceOptions, PricingTier};
use crate::rating::RatingSummary;
use crate::types::{Category, ProductId, UnknownVariant};

/// A catalog product with its tiers and derived rating fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: Category,
    pub pricing_tiers: Vec<PricingTier>,
    #[serde(flatten)]
    pub rating: RatingSummary,
}

impl Product {
    /// The unit prices this product can be bought at.
    #[must_use]
    pub fn price_options(&self) -> PriceOptions {
        PriceOptions::new(self.price, self.pricing_tiers.clone())
    }

    /// The fields a cart line keeps.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            image: self.image.clone(),
        }
    }
}

/// List ordering for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Catalog order (by id).
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    /// Highest average rating first.
    Rating,
}

impl FromStr for SortOrder {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "rating" => Ok(Self::Rating),
            other => Err(UnknownVariant {
                kind: "sort order",
                value: other.to_owned(),
            }),
        }
    }
}

/// Filters and ordering applied to a product list.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CatalogQuery {
    pub category: Option<Category>,
    /// Keep products whose average rating is at least this.
    pub min_rating: Option<f64>,
    pub sort: SortOrder,
}

impl CatalogQuery {
    /// Filter and sort `products` in place.
    ///
    /// Sorting is stable, so ties keep catalog order.
    pub fn apply(&self, products: &mut Vec<Product>) {
        if let Some(category) = self.category {
            products.retain(|p| p.category == category);
        }
        if let Some(min) = self.min_rating.filter(|m| *m > 0.0) {
            products.retain(|p| p.rating.avg_rating >= min);
        }

        match self.sort {
            SortOrder::Featured => products.sort_by_key(|p| p.id),
            SortOrder::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Rating => products.sort_by(|a, b| {
                b.rating.avg_rating.total_cmp(&a.rating.avg_rating)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn product(id: i32, price: Decimal, category: Category, avg: f64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("P{id}"),
            description: String::new(),
            price,
            image: None,
            category,
            pricing_tiers: Vec::new(),
            rating: RatingSummary {
                avg_rating: avg,
                review_count: i64::from(avg > 0.0),
            },
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, dec!(15), Category::Pantry, 4.5),
            product(2, dec!(9.99), Category::Garden, 0.0),
            product(3, dec!(30), Category::Pantry, 3.0),
            product(4, dec!(12), Category::Household, 5.0),
        ]
    }

    fn ids(products: &[Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_default_query_keeps_catalog_order() {
        let mut products = catalog();
        products.reverse();
        CatalogQuery::default().apply(&mut products);
        assert_eq!(ids(&products), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_filter_by_category() {
        let mut products = catalog();
        CatalogQuery {
            category: Some(Category::Pantry),
            ..CatalogQuery::default()
        }
        .apply(&mut products);
        assert_eq!(ids(&products), vec![1, 3]);
    }

    #[test]
    fn test_min_rating() {
        let mut products = catalog();
        CatalogQuery {
            min_rating: Some(4.0),
            ..CatalogQuery::default()
        }
        .apply(&mut products);
        assert_eq!(ids(&products), vec![1, 4]);
    }

    #[test]
    fn test_sorts() {
        let mut products = catalog();
        CatalogQuery {
            sort: SortOrder::PriceLow,
            ..CatalogQuery::default()
        }
        .apply(&mut products);
        assert_eq!(ids(&products), vec![2, 4, 1, 3]);

        CatalogQuery {
            sort: SortOrder::PriceHigh,
            ..CatalogQuery::default()
        }
        .apply(&mut products);
        assert_eq!(ids(&products), vec![3, 1, 4, 2]);

        CatalogQuery {
            sort: SortOrder::Rating,
            ..CatalogQuery::default()
        }
        .apply(&mut products);
        assert_eq!(ids(&products), vec![4, 1, 3, 2]);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("price-low".parse(), Ok(SortOrder::PriceLow));
        assert!("cheapest".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_product_serializes_flat_rating() {
        let json = serde_json::to_value(product(1, dec!(15), Category::Pantry, 4.5))
            .unwrap_or_default();
        assert_eq!(json["avg_rating"], serde_json::json!(4.5));
        assert_eq!(json["review_count"], serde_json::json!(1));
        assert_eq!(json["category"], serde_json::json!("Pantry"));
        assert_eq!(json["price"], serde_json::json!(15.0));
    }
}
