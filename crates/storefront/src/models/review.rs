//! Review domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use harbor_core::{ProductId, Rating, ReviewId};

/// A stored product review.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub customer_name: String,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A validated review submission.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: ProductId,
    pub customer_name: String,
    pub rating: Rating,
    pub comment: String,
}
