//! Per-employee ledger totals for a period.
//!
//! This module contains [`LedgerDuration`], which keeps the provider's
//! canonical `HH:MM` text together with its decimal hours, [`TotalsSnapshot`]
//! for one totals response, and [`PeriodTotals`], the persisted row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::parse_duration;

use super::Period;

/// A signed ledger duration.
///
/// The decimal hours are always derived from the canonical text, so the
/// two can never disagree. Deserialization ignores any `hours` field and
/// re-derives it.
///
/// # Example
///
/// ```
/// use timesheet_sync::models::LedgerDuration;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let balance = LedgerDuration::parse("-02:30");
/// assert_eq!(balance.text(), "-02:30");
/// assert_eq!(balance.hours(), Decimal::from_str("-2.5").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LedgerDurationRepr")]
pub struct LedgerDuration {
    text: String,
    hours: Decimal,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LedgerDurationRepr {
    Text(String),
    Full { text: String },
}

impl From<LedgerDurationRepr> for LedgerDuration {
    fn from(repr: LedgerDurationRepr) -> Self {
        match repr {
            LedgerDurationRepr::Text(text) | LedgerDurationRepr::Full { text } => {
                LedgerDuration::parse(text)
            }
        }
    }
}

impl LedgerDuration {
    /// Builds a duration from its canonical text.
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let hours = parse_duration(Some(&text));
        Self { text, hours }
    }

    /// A zero duration with empty text, used when the provider omits a column.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            hours: Decimal::ZERO,
        }
    }

    /// The canonical text as reported upstream.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The decimal hours derived from the text.
    pub fn hours(&self) -> Decimal {
        self.hours
    }
}

/// The totals of one employee over one period, as parsed from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsSnapshot {
    /// Normal (scheduled) hours worked.
    pub normal: LedgerDuration,
    /// Absence hours.
    pub absence: LedgerDuration,
    /// Overtime hours paid at the 50% premium.
    pub overtime_50: LedgerDuration,
    /// Overtime hours paid at the 100% premium.
    pub overtime_100: LedgerDuration,
    /// Hours credited to the bank in the period.
    pub bank_credit: LedgerDuration,
    /// Hours debited from the bank in the period.
    pub bank_debit: LedgerDuration,
    /// Signed bank balance.
    pub bank_balance: LedgerDuration,
}

/// A persisted totals row, unique per (period, employee reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTotals {
    /// The period the totals cover.
    pub period: Period,
    /// The employee's tax/payroll identifier.
    pub employee_ref: String,
    /// The employee's display name at import time.
    pub employee_name: String,
    /// Parsed totals.
    pub totals: TotalsSnapshot,
    /// The raw upstream payload the totals were parsed from.
    pub raw_payload: serde_json::Value,
    /// Identity of the caller that ran the import.
    pub imported_by: String,
    /// When the row was imported.
    pub imported_at: DateTime<Utc>,
}

impl PeriodTotals {
    /// The (period, employee) key this row is upserted under.
    pub fn key(&self) -> (Period, &str) {
        (self.period, self.employee_ref.as_str())
    }

    /// Decimal bank balance, derived from the canonical balance text.
    pub fn balance_hours(&self) -> Decimal {
        self.totals.bank_balance.hours()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_derives_hours() {
        let duration = LedgerDuration::parse("12:45");
        assert_eq!(duration.hours(), dec("12.75"));
        assert_eq!(duration.text(), "12:45");
    }

    #[test]
    fn test_empty_is_zero() {
        let duration = LedgerDuration::empty();
        assert_eq!(duration.hours(), Decimal::ZERO);
        assert_eq!(duration.text(), "");
    }

    #[test]
    fn test_deserialize_rederives_hours_from_text() {
        let json = serde_json::json!({ "text": "-01:30", "hours": "99" });
        let duration: LedgerDuration = serde_json::from_value(json).unwrap();
        assert_eq!(duration.hours(), dec("-1.5"));
    }

    #[test]
    fn test_deserialize_from_plain_string() {
        let duration: LedgerDuration = serde_json::from_str("\"03:00\"").unwrap();
        assert_eq!(duration.hours(), dec("3"));
    }

    #[test]
    fn test_serialize_includes_text_and_hours() {
        let json = serde_json::to_value(LedgerDuration::parse("-02:30")).unwrap();
        assert_eq!(json["text"], "-02:30");
        assert_eq!(dec(json["hours"].as_str().unwrap()), dec("-2.5"));
    }
}
