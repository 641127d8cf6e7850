//! Review submission.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::instrument;

use harbor_core::{ProductId, Rating, ReviewId};

use super::{required, within_limit};
use crate::db::{ProductRepository, ReviewRepository};
use crate::error::AppError;
use crate::models::NewReview;

const MAX_NAME_LEN: usize = 100;
const MAX_COMMENT_LEN: usize = 2000;

/// Review submission as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewRequest {
    pub customer_name: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

impl ReviewRequest {
    /// Validate the submission without touching the database.
    fn validate(self, product_id: ProductId) -> Result<NewReview, AppError> {
        let rating = self
            .rating
            .ok_or_else(|| AppError::Validation("rating is required".to_string()))
            .and_then(|r| Rating::new(r).map_err(AppError::validation))?;
        let customer_name = required("customer_name", self.customer_name)?;
        within_limit("customer_name", &customer_name, MAX_NAME_LEN)?;
        let comment = self.comment.map(|c| c.trim().to_string()).unwrap_or_default();
        within_limit("comment", &comment, MAX_COMMENT_LEN)?;

        Ok(NewReview {
            product_id,
            customer_name,
            rating,
            comment,
        })
    }
}

/// Validate and store a review.
///
/// The rating is checked before the product lookup, so an out-of-range
/// rating is a validation error even for a missing product.
///
/// # Errors
///
/// Returns `AppError::Validation` for bad input, `AppError::NotFound` if the
/// product does not exist and `AppError::Persistence` if the write fails.
#[instrument(skip(pool, request))]
pub async fn submit_review(
    pool: &PgPool,
    product_id: ProductId,
    request: ReviewRequest,
) -> Result<ReviewId, AppError> {
    let review = request.validate(product_id)?;

    if !ProductRepository::new(pool).exists(product_id).await? {
        return Err(AppError::NotFound("Product"));
    }

    let id = ReviewRepository::new(pool)
        .create(&review)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::NotFound(_) => AppError::NotFound("Product"),
            other => other,
        })?;
    tracing::info!(review_id = %id, rating = review.rating.value(), "Review stored");
    Ok(id)
}
