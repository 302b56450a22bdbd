use crate::error::ApiError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// A user rating from 0.5 to 5 stars in half-star steps, stored as a count of
/// half stars (1..=10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: Rating = Rating(10);

    pub fn new(value: f64) -> Result<Self, ApiError> {
        let halves = value * 2.0;
        if !halves.is_finite() || halves.fract() != 0.0 || !(1.0..=10.0).contains(&halves) {
            return Err(ApiError::InvalidRating(value));
        }
        Ok(Rating(halves as u8))
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    pub fn half_stars(self) -> u8 {
        self.0
    }

    /// True when the rating is exactly `stars` whole stars.
    pub fn is_exactly(self, stars: u8) -> bool {
        u16::from(self.0) == u16::from(stars) * 2
    }

    pub fn all() -> impl Iterator<Item = Rating> {
        (1..=10).map(Rating)
    }
}

impl TryFrom<f64> for Rating {
    type Error = ApiError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> f64 {
        rating.value()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

/// Backend rows use `null` or `0` for "not rated". A number that is not a
/// valid half-star rating is also read as unrated rather than failing the row.
pub(crate) fn deserialize_optional_rating<'de, D>(
    deserializer: D,
) -> Result<Option<Rating>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(v) if v == 0.0 => Ok(None),
        Some(v) => match Rating::new(v) {
            Ok(rating) => Ok(Some(rating)),
            Err(e) => {
                warn!("Ignoring stored rating: {}", e);
                Ok(None)
            }
        },
    }
}
