//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use harbor_core::{ProductId, Rating, ReviewId};

use super::RepositoryError;
use crate::models::{NewReview, Review};

#[derive(Debug, FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    customer_name: String,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepositoryError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let rating = Rating::new(i64::from(row.rating)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid rating on review {}: {e}", row.id))
        })?;
        Ok(Self {
            id: row.id,
            product_id: row.product_id,
            customer_name: row.customer_name,
            rating,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Reviews for a product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored rating is out of range.
    #[instrument(skip(self))]
    pub async fn list_for_product(&self, product_id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            r"
            SELECT id, product_id, customer_name, rating, comment, created_at
            FROM reviews
            WHERE product_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Review::try_from).collect()
    }

    /// Store a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    pub async fn create(&self, review: &NewReview) -> Result<ReviewId, RepositoryError> {
        sqlx::query_scalar(
            r"
            INSERT INTO reviews (product_id, customer_name, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(review.product_id)
        .bind(&review.customer_name)
        .bind(i16::from(review.rating))
        .bind(&review.comment)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_insert)
    }
}
