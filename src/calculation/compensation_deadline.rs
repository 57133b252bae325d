//! Statutory compensation deadline for banked hours.
//!
//! Hours banked in a period must be compensated by the last day of the
//! month that lies a fixed number of months later. The window depends on
//! the agreement regime.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Period;

/// The agreement under which the hour bank was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationRegime {
    /// Individual written agreement: six-month window.
    #[default]
    Individual,
    /// Collective agreement: twelve-month window.
    Collective,
}

impl CompensationRegime {
    /// Length of the compensation window in calendar months.
    pub fn window_months(&self) -> u32 {
        match self {
            CompensationRegime::Individual => 6,
            CompensationRegime::Collective => 12,
        }
    }
}

/// Returns the last day on which hours banked in `period` may be compensated.
///
/// # Example
///
/// ```
/// use timesheet_sync::calculation::{compensation_deadline, CompensationRegime};
/// use chrono::NaiveDate;
///
/// let period = "2025-01".parse().unwrap();
/// assert_eq!(
///     compensation_deadline(period, CompensationRegime::Individual),
///     NaiveDate::from_ymd_opt(2025, 7, 31).unwrap()
/// );
/// ```
pub fn compensation_deadline(period: Period, regime: CompensationRegime) -> NaiveDate {
    period.plus_months(regime.window_months()).last_day()
}

/// Whole days from `today` until `deadline`; negative once the deadline passed.
pub fn days_remaining(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days()
}
