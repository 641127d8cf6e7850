//! Review ratings and their per-product aggregate.

use serde::{Deserialize, Serialize};

/// A rating outside the 1 to 5 star range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between 1 and 5, got {got}")]
pub struct RatingError {
    pub got: i64,
}

/// A star rating in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i16")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a submitted rating.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError`] when `value` is outside `1..=5`.
    pub fn new(value: i64) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError { got: value })
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = RatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for i16 {
    fn from(rating: Rating) -> Self {
        Self::from(rating.0)
    }
}

/// Average rating and review count for one product.
///
/// Always computed from the full set of current ratings; nothing is kept
/// incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RatingSummary {
    /// Arithmetic mean of the ratings, `0.0` when there are none.
    pub avg_rating: f64,
    pub review_count: i64,
}

impl RatingSummary {
    /// Summarize a set of ratings.
    #[must_use]
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0_i64, 0_i64), |(sum, count), r| {
                (sum + i64::from(r.value()), count + 1)
            });

        if count == 0 {
            return Self::default();
        }

        #[allow(clippy::cast_precision_loss)] // review counts stay far below 2^52
        let avg_rating = sum as f64 / count as f64;
        Self {
            avg_rating,
            review_count: count,
        }
    }
}
