//! Option expiration and time to maturity
//!
//! Standard monthly and quarterly equity options expire on Fridays, so a
//! calendar offset from the reference date is rolled forward to the next
//! Friday (or kept if it already is one).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::{BSError, BSResult};

/// Day count used to turn days to expiration into years
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Coarse expiration horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Month,
    Quarter,
    Year,
    TwoYears,
}

impl Interval {
    /// Calendar offset in months
    pub fn months(&self) -> u32 {
        match self {
            Interval::Month => 1,
            Interval::Quarter => 3,
            Interval::Year => 12,
            Interval::TwoYears => 24,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Month => "month",
            Interval::Quarter => "quarter",
            Interval::Year => "year",
            Interval::TwoYears => "two_years",
        }
    }
}

impl FromStr for Interval {
    type Err = BSError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(Interval::Month),
            "quarter" => Ok(Interval::Quarter),
            "year" => Ok(Interval::Year),
            "two_years" => Ok(Interval::TwoYears),
            _ => Err(BSError::InvalidInterval(s.to_string())),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contract expiration relative to a reference date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Expiration {
    /// Expiration date (always a Friday)
    pub date: NaiveDate,
    /// Whole calendar days from the reference date
    pub days: i64,
    /// Time to maturity in years (days / 365)
    pub tau: f64,
}

/// The first Friday on or after `date`
pub fn next_friday(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday() as i64;
    date + Duration::days((4 - weekday).rem_euclid(7))
}

/// Expiration date, day count and τ for `interval` starting at `reference_date`.
///
/// Month arithmetic keeps the day of month, clamped to the last valid day
/// (Jan 31 + 1 month = Feb 28/29).
pub fn compute_expiration(reference_date: NaiveDate, interval: Interval) -> BSResult<Expiration> {
    let offset = reference_date
        .checked_add_months(Months::new(interval.months()))
        .ok_or_else(|| {
            BSError::data(format!("{} + {} is out of range", reference_date, interval))
        })?;

    let date = next_friday(offset);
    let days = (date - reference_date).num_days();

    Ok(Expiration {
        date,
        days,
        tau: days as f64 / DAYS_PER_YEAR,
    })
}
