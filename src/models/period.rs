//! Calendar period (competência) model.
//!
//! A [`Period`] is a year-month over which ledger totals are computed. It is
//! written and parsed as `YYYY-MM`.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar year-month.
///
/// # Example
///
/// ```
/// use timesheet_sync::models::Period;
/// use chrono::NaiveDate;
///
/// let period: Period = "2025-02".parse().unwrap();
/// assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
/// assert_eq!(period.last_day(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
/// assert_eq!(period.to_string(), "2025-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    first_day: NaiveDate,
}

impl Period {
    /// Creates a period for the given year and month (1-12).
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if !(1..=9999).contains(&year) {
            return Err(EngineError::validation(format!(
                "period year {year} is out of range"
            )));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| {
                EngineError::validation(format!("period month {month} is out of range"))
            })
    }

    /// Returns the period containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The year of the period.
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The month of the period (1-12).
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// The first calendar day of the period.
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// The last calendar day of the period.
    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(self.first_day)
    }

    /// Returns the period `months` calendar months later.
    pub fn plus_months(&self, months: u32) -> Self {
        self.first_day
            .checked_add_months(Months::new(months))
            .map(|first_day| Self { first_day })
            .unwrap_or(*self)
    }
}

impl FromStr for Period {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::validation(format!("period '{s}' must be YYYY-MM"));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for Period {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}
