//! Calendar day used by the daily challenge
//!
//! Days are UTC days. The textual form is always `YYYY-MM-DD`, which is also the
//! persisted form.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A UTC calendar day (`YYYY-MM-DD`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameDate(NaiveDate);

impl GameDate {
    /// Build a date from year, month and day.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DomainError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| {
                DomainError::validation(format!("Invalid date: {year:04}-{month:02}-{day:02}"))
            })
    }

    /// The UTC day containing `instant`.
    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self(instant.date_naive())
    }

    #[inline]
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// The following day.
    pub fn next(&self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }

    /// The preceding day.
    pub fn previous(&self) -> Self {
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    /// Whole days from `self` to `later` (negative when `later` is earlier).
    pub fn days_until(&self, later: GameDate) -> i64 {
        (later.0 - self.0).num_days()
    }

    /// Daily seed: `YYYY·10000 + MM·100 + DD`.
    ///
    /// Every node derives the same seed for the same day, which is what makes the
    /// daily question selection identical worldwide.
    pub fn seed(&self) -> i64 {
        i64::from(self.0.year()) * 10_000 + i64::from(self.0.month()) * 100 + i64::from(self.0.day())
    }

    /// Midnight UTC at the start of the following day.
    pub fn start_of_next_day(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.next().0.and_time(NaiveTime::MIN))
    }

    /// Midnight UTC at the start of this day.
    pub fn start_of_day(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(NaiveTime::MIN))
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for GameDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|e| DomainError::parse(format!("Invalid date '{}': {}", s, e)))
    }
}

impl TryFrom<String> for GameDate {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<GameDate> for String {
    fn from(date: GameDate) -> String {
        date.to_string()
    }
}
