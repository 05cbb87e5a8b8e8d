//! Bounded numeric value objects used by the content model
//!
//! All three are valid by construction: the only way to obtain one is through
//! `new()`, which rejects out-of-range input.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Upper bound for question points
pub const MAX_POINTS: u32 = 1000;

/// Upper bound for a per-question time limit, in seconds
pub const MAX_TIME_LIMIT_SECS: u32 = 3600;

/// Upper bound for a passing score percentage
pub const MAX_PASSING_SCORE: u32 = 100;

// ============================================================================
// Points
// ============================================================================

/// Points awarded for a question (0..=1000)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Points(u32);

impl Points {
    pub fn new(value: u32) -> Result<Self, DomainError> {
        if value > MAX_POINTS {
            return Err(DomainError::validation(format!(
                "Points cannot exceed {}, got {}",
                MAX_POINTS, value
            )));
        }
        Ok(Self(value))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Points {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Points> for u32 {
    fn from(points: Points) -> u32 {
        points.0
    }
}

// ============================================================================
// TimeLimit
// ============================================================================

/// Per-question time limit in seconds (1..=3600)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TimeLimit(u32);

impl TimeLimit {
    pub fn new(seconds: u32) -> Result<Self, DomainError> {
        if seconds == 0 || seconds > MAX_TIME_LIMIT_SECS {
            return Err(DomainError::validation(format!(
                "Time limit must be between 1 and {} seconds, got {}",
                MAX_TIME_LIMIT_SECS, seconds
            )));
        }
        Ok(Self(seconds))
    }

    #[inline]
    pub fn seconds(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn millis(&self) -> u64 {
        u64::from(self.0) * 1000
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl TryFrom<u32> for TimeLimit {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TimeLimit> for u32 {
    fn from(limit: TimeLimit) -> u32 {
        limit.0
    }
}

// ============================================================================
// PassingScore
// ============================================================================

/// Percentage of total points required to pass (0..=100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PassingScore(u32);

impl PassingScore {
    pub fn new(percent: u32) -> Result<Self, DomainError> {
        if percent > MAX_PASSING_SCORE {
            return Err(DomainError::validation(format!(
                "Passing score must be between 0 and {}, got {}",
                MAX_PASSING_SCORE, percent
            )));
        }
        Ok(Self(percent))
    }

    #[inline]
    pub fn percent(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for PassingScore {
    type Error = DomainError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PassingScore> for u32 {
    fn from(score: PassingScore) -> u32 {
        score.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_bounds() {
        assert!(Points::new(0).is_ok());
        assert!(Points::new(1000).is_ok());
        assert!(matches!(
            Points::new(1001),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_time_limit_bounds() {
        assert!(TimeLimit::new(0).is_err());
        assert_eq!(TimeLimit::new(1).unwrap().millis(), 1000);
        assert!(TimeLimit::new(3600).is_ok());
        assert!(TimeLimit::new(3601).is_err());
    }

    #[test]
    fn test_passing_score_bounds() {
        assert_eq!(PassingScore::new(100).unwrap().percent(), 100);
        assert!(PassingScore::new(101).is_err());
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        let ok: Points = serde_json::from_str("250").unwrap();
        assert_eq!(ok.value(), 250);
        assert!(serde_json::from_str::<Points>("5000").is_err());
        assert!(serde_json::from_str::<TimeLimit>("0").is_err());
    }
}
