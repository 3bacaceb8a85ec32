use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// A row from the `comments` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
    pub user_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub rating: Option<i16>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Review count and average rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReviewStats {
    pub total_reviews: usize,
    /// Rounded to two decimal places; `0.0` without reviews.
    pub average_rating: f64,
}

impl ReviewStats {
    /// Every comment counts as a review. A comment without a rating adds
    /// zero to the sum, so it pulls the average down.
    #[must_use]
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Option<i16>>,
    {
        let (total_reviews, sum) = ratings
            .into_iter()
            .fold((0usize, 0i64), |(count, sum), rating| {
                (count + 1, sum + i64::from(rating.unwrap_or(0)))
            });

        if total_reviews == 0 {
            return Self {
                total_reviews,
                average_rating: 0.0,
            };
        }

        #[allow(clippy::cast_precision_loss)]
        let average = sum as f64 / total_reviews as f64;

        Self {
            total_reviews,
            average_rating: (average * 100.0).round() / 100.0,
        }
    }

    #[must_use]
    pub fn from_comments(comments: &[Comment]) -> Self {
        Self::from_ratings(comments.iter().map(|c| c.rating))
    }
}

/// Checks that a rating lies within `1..=5`.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRating`] for anything outside the range.
pub fn validate_rating(rating: i64) -> Result<i16, CoreError> {
    i16::try_from(rating)
        .ok()
        .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
        .ok_or(CoreError::InvalidRating(rating))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_comments_yields_zero_average() {
        let stats = ReviewStats::from_ratings(Vec::new());
        assert_eq!(stats.total_reviews, 0);
        assert!(stats.average_rating.abs() < f64::EPSILON);
    }

    #[test]
    fn unrated_comment_counts_toward_total_and_dilutes_average() {
        let stats = ReviewStats::from_ratings([Some(4), None, Some(2)]);
        assert_eq!(stats.total_reviews, 3);
        assert!((stats.average_rating - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn average_rounds_to_two_decimals() {
        let stats = ReviewStats::from_ratings([Some(5), Some(4), Some(4)]);
        assert!((stats.average_rating - 4.33).abs() < f64::EPSILON);

        let stats = ReviewStats::from_ratings([Some(5), Some(5), Some(4)]);
        assert!((stats.average_rating - 4.67).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_rating_accepts_bounds() {
        assert_eq!(validate_rating(1), Ok(1));
        assert_eq!(validate_rating(5), Ok(5));
    }

    #[test]
    fn validate_rating_rejects_out_of_range() {
        assert_eq!(validate_rating(0), Err(CoreError::InvalidRating(0)));
        assert_eq!(validate_rating(6), Err(CoreError::InvalidRating(6)));
        assert_eq!(
            validate_rating(i64::from(i32::MAX)),
            Err(CoreError::InvalidRating(i64::from(i32::MAX)))
        );
    }
}
