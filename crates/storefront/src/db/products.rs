//! Product repository for catalog database operations.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use harbor_core::pricing::validate_tiers;
use harbor_core::{Category, PricingTier, Product, ProductId, RatingSummary};

use super::RepositoryError;
use crate::models::NewProduct;

/// Products with live rating aggregates. `$1` optionally restricts the ids.
const SELECT_PRODUCTS: &str = r"
    SELECT p.id, p.name, p.description, p.price, p.image, p.category,
           COALESCE(AVG(r.rating), 0)::FLOAT8 AS avg_rating,
           COUNT(r.id) AS review_count
    FROM products p
    LEFT JOIN reviews r ON r.product_id = p.id
    WHERE ($1::INT4[] IS NULL OR p.id = ANY($1))
    GROUP BY p.id
    ORDER BY p.id
";

const SELECT_TIERS: &str = r"
    SELECT product_id, label, quantity, price
    FROM pricing_tiers
    WHERE ($1::INT4[] IS NULL OR product_id = ANY($1))
    ORDER BY product_id, position
";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Decimal,
    image: Option<String>,
    category: Category,
    avg_rating: f64,
    review_count: i64,
}

#[derive(Debug, FromRow)]
struct TierRow {
    product_id: ProductId,
    label: String,
    quantity: i32,
    price: Decimal,
}

/// Repository for catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All products in catalog order, with tiers and rating aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.fetch(None).await
    }

    /// A single product, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.fetch(Some(vec![id.as_i32()])).await?.into_iter().next())
    }

    /// The products among `ids` that exist, keyed by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn get_many(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Product>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let products = self.fetch(Some(ids)).await?;
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    /// Whether a product with this id exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(found)
    }

    /// Insert a product and its tiers unless one with the same name exists.
    ///
    /// Returns the new id, or `None` when the name was already taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a write fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn insert_if_absent(
        &self,
        product: &NewProduct,
    ) -> Result<Option<ProductId>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: Option<ProductId> = sqlx::query_scalar(
            r"
            INSERT INTO products (name, description, price, image, category)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (name) DO NOTHING
            RETURNING id
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.image.as_deref())
        .bind(product.category)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(id) = id else {
            return Ok(None);
        };

        for (position, tier) in product.pricing_tiers.iter().enumerate() {
            let position = i16::try_from(position).map_err(|_| {
                RepositoryError::DataCorruption(format!("too many pricing tiers for {}", product.name))
            })?;
            sqlx::query(
                r"
                INSERT INTO pricing_tiers (product_id, position, label, quantity, price)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(id)
            .bind(position)
            .bind(&tier.label)
            .bind(tier.quantity)
            .bind(tier.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(id))
    }

    /// Delete every product together with the orders and reviews that
    /// reference them. Returns the number of products removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a delete fails.
    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM order_items").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM orders").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM reviews").execute(&mut *tx).await?;
        let removed = sqlx::query("DELETE FROM products")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;
        Ok(removed)
    }

    async fn fetch(&self, ids: Option<Vec<i32>>) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(SELECT_PRODUCTS)
            .bind(ids.as_deref())
            .fetch_all(self.pool)
            .await?;
        let tier_rows: Vec<TierRow> = sqlx::query_as(SELECT_TIERS)
            .bind(ids.as_deref())
            .fetch_all(self.pool)
            .await?;

        let mut tiers = group_tiers(tier_rows);
        Ok(rows
            .into_iter()
            .map(|row| {
                let pricing_tiers = tiers.remove(&row.id).unwrap_or_default();
                row.into_product(pricing_tiers)
            })
            .collect())
    }
}

impl ProductRow {
    fn into_product(self, pricing_tiers: Vec<PricingTier>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            image: self.image,
            category: self.category,
            pricing_tiers,
            rating: RatingSummary {
                avg_rating: self.avg_rating,
                review_count: self.review_count,
            },
        }
    }
}

/// Group tier rows by product, dropping a product's tiers entirely if any of
/// them is invalid so it sells at its base price only.
fn group_tiers(rows: Vec<TierRow>) -> HashMap<ProductId, Vec<PricingTier>> {
    let mut grouped: HashMap<ProductId, Vec<PricingTier>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(PricingTier {
            label: row.label,
            quantity: row.quantity,
            price: row.price,
        });
    }

    grouped.retain(|product_id, tiers| match validate_tiers(tiers) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(%product_id, error = %e, "Ignoring invalid pricing tiers");
            false
        }
    });
    grouped
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn tier(product_id: i32, label: &str, price: Decimal) -> TierRow {
        TierRow {
            product_id: ProductId::new(product_id),
            label: label.to_string(),
            quantity: 1,
            price,
        }
    }

    #[test]
    fn test_group_tiers_keeps_order() {
        let grouped = group_tiers(vec![
            tier(1, "1 jar", dec!(6)),
            tier(2, "single", dec!(3)),
            tier(1, "3 jars", dec!(15)),
        ]);
        let labels: Vec<&str> = grouped
            .get(&ProductId::new(1))
            .map(|t| t.iter().map(|t| t.label.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(labels, vec!["1 jar", "3 jars"]);
        assert_eq!(grouped.get(&ProductId::new(2)).map(Vec::len), Some(1));
    }

    #[test]
    fn test_group_tiers_drops_invalid_sets() {
        let grouped = group_tiers(vec![
            tier(1, "dup", dec!(6)),
            tier(1, "dup", dec!(9)),
            tier(2, "ok", dec!(3)),
        ]);
        assert!(!grouped.contains_key(&ProductId::new(1)));
        assert!(grouped.contains_key(&ProductId::new(2)));
    }
}
