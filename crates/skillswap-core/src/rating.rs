//! Ratings left on teachers
//!
//! Stored as `ratings/{teacherId}/{raterId}`. A rater has at most one entry
//! per teacher; writing again replaces it.

use crate::{CoreError, Result, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// A score from 1 to 5 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RatingScore(u8);

impl RatingScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(score: i64) -> Result<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&score) {
            Ok(RatingScore(score as u8))
        } else {
            Err(CoreError::InvalidRating(score))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RatingScore {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self> {
        RatingScore::new(value)
    }
}

impl From<RatingScore> for u8 {
    fn from(score: RatingScore) -> Self {
        score.0
    }
}

impl fmt::Display for RatingScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rating document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub rating: RatingScore,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Rating {
    /// Build a rating, treating a blank comment as no comment
    pub fn new(score: RatingScore, comment: impl Into<String>) -> Self {
        let comment = comment.into().trim().to_string();
        Rating {
            rating: score,
            comment: (!comment.is_empty()).then_some(comment),
        }
    }
}

/// Average of a set of ratings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: usize,
}

impl RatingSummary {
    /// Arithmetic mean of the scores; an empty set averages to zero
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = RatingScore>,
    {
        let (sum, count) = scores
            .into_iter()
            .fold((0u64, 0usize), |(sum, count), s| (sum + s.get() as u64, count + 1));

        let average = if count == 0 {
            0.0
        } else {
            sum as f64 / count as f64
        };
        RatingSummary { average, count }
    }

    /// Average with one decimal, e.g. `"4.5"`
    pub fn display_average(&self) -> String {
        format!("{:.1}", self.average)
    }
}

/// All ratings of one teacher, keyed by rater
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingSet {
    entries: BTreeMap<UserId, Rating>,
}

impl RatingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a `ratings/{teacherId}` snapshot
    ///
    /// Entries with an invalid rater key or a malformed body are skipped.
    pub fn from_value(value: Option<&Value>) -> Self {
        let mut set = RatingSet::new();
        let Some(Value::Object(map)) = value else {
            return set;
        };

        for (rater, body) in map {
            let Ok(rater_id) = UserId::new(rater.as_str()) else {
                warn!("Skipping rating with invalid rater key {:?}", rater);
                continue;
            };
            match serde_json::from_value::<Rating>(body.clone()) {
                Ok(rating) => {
                    set.entries.insert(rater_id, rating);
                }
                Err(e) => warn!("Skipping malformed rating from {}: {}", rater, e),
            }
        }
        set
    }

    /// Insert or replace the rater's entry
    pub fn insert(&mut self, rater: UserId, rating: Rating) -> Option<Rating> {
        self.entries.insert(rater, rating)
    }

    pub fn get(&self, rater: &UserId) -> Option<&Rating> {
        self.entries.get(rater)
    }

    pub fn summary(&self) -> RatingSummary {
        RatingSummary::from_scores(self.entries.values().map(|r| r.rating))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &Rating)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scores(values: &[i64]) -> Vec<RatingScore> {
        values.iter().map(|v| RatingScore::new(*v).unwrap()).collect()
    }

    #[test]
    fn test_average_of_two() {
        let summary = RatingSummary::from_scores(scores(&[4, 2]));
        assert_eq!(summary.average, 3.0);
        assert_eq!(summary.count, 2);
    }

    #[test]
    fn test_empty_average_is_zero() {
        let summary = RatingSummary::from_scores(Vec::new());
        assert_eq!(summary.average, 0.0);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.display_average(), "0.0");
    }

    #[test]
    fn test_average_matches_sum_over_count() {
        for set in [vec![5], vec![1, 2], vec![5, 4, 4], vec![1, 1, 1, 2, 5]] {
            let summary = RatingSummary::from_scores(scores(&set));
            let expected = set.iter().sum::<i64>() as f64 / set.len() as f64;
            assert!((summary.average - expected).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_score_bounds() {
        assert!(RatingScore::new(0).is_err());
        assert!(RatingScore::new(6).is_err());
        assert_eq!(RatingScore::new(5).unwrap().get(), 5);
    }

    #[test]
    fn test_rating_wire_format() {
        let rating = Rating::new(RatingScore::new(4).unwrap(), "  ");
        assert_eq!(serde_json::to_value(&rating).unwrap(), json!({"rating": 4}));

        let rating = Rating::new(RatingScore::new(3).unwrap(), "Patient teacher");
        assert_eq!(
            serde_json::to_value(&rating).unwrap(),
            json!({"rating": 3, "comment": "Patient teacher"})
        );
    }

    #[test]
    fn test_rating_set_skips_malformed() {
        let value = json!({
            "r1": {"rating": 4, "comment": ""},
            "r2": {"rating": 2},
            "r3": {"rating": 9},
            "r4": "garbage"
        });
        let set = RatingSet::from_value(Some(&value));
        assert_eq!(set.len(), 2);
        assert_eq!(set.summary().average, 3.0);
    }

    #[test]
    fn test_rating_set_overwrites_per_rater() {
        let mut set = RatingSet::new();
        let rater = UserId::new("r1").unwrap();
        set.insert(rater.clone(), Rating::new(RatingScore::new(1).unwrap(), ""));
        set.insert(rater.clone(), Rating::new(RatingScore::new(5).unwrap(), ""));
        assert_eq!(set.len(), 1);
        assert_eq!(set.summary().average, 5.0);
    }
}
