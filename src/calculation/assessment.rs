//! Compliance assessment of a period's totals.
//!
//! Combines the risk tier, the liability projection and the compensation
//! deadline into one derived record. Nothing here is persisted; it is
//! recomputed from [`TotalsSnapshot`] whenever totals are served.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ComplianceConfig;
use crate::models::{Period, TotalsSnapshot};

use super::compensation_deadline::{compensation_deadline, days_remaining};
use super::liability::project_liability;
use super::risk_tier::{RiskTier, classify_balance};

/// Derived compliance view of one employee's totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceAssessment {
    /// Tier of the absolute bank balance.
    pub tier: RiskTier,
    /// Signed bank balance in decimal hours.
    pub balance_hours: Decimal,
    /// Projected monetary liability of the period's overtime.
    pub liability: Decimal,
    /// Last day to compensate the period's banked hours.
    pub deadline: NaiveDate,
    /// Days from `today` until the deadline.
    pub days_remaining: i64,
}

/// Assesses a totals snapshot for `period` as of `today`.
///
/// # Example
///
/// ```
/// use timesheet_sync::calculation::{assess_compliance, RiskTier};
/// use timesheet_sync::config::ComplianceConfig;
/// use timesheet_sync::models::{LedgerDuration, TotalsSnapshot};
/// use chrono::NaiveDate;
///
/// let totals = TotalsSnapshot {
///     normal: LedgerDuration::parse("160:00"),
///     absence: LedgerDuration::empty(),
///     overtime_50: LedgerDuration::parse("10:00"),
///     overtime_100: LedgerDuration::empty(),
///     bank_credit: LedgerDuration::parse("25:00"),
///     bank_debit: LedgerDuration::empty(),
///     bank_balance: LedgerDuration::parse("25:00"),
/// };
/// let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
/// let assessment = assess_compliance(&totals, "2025-01".parse().unwrap(), &ComplianceConfig::default(), today);
/// assert_eq!(assessment.tier, RiskTier::Atencao);
/// assert_eq!(assessment.days_remaining, 30);
/// ```
pub fn assess_compliance(
    totals: &TotalsSnapshot,
    period: Period,
    config: &ComplianceConfig,
    today: NaiveDate,
) -> ComplianceAssessment {
    let balance_hours = totals.bank_balance.hours();
    let projection = project_liability(
        totals.overtime_50.hours(),
        totals.overtime_100.hours(),
        config,
    );
    let deadline = compensation_deadline(period, config.regime);

    ComplianceAssessment {
        tier: classify_balance(balance_hours),
        balance_hours,
        liability: projection.total,
        deadline,
        days_remaining: days_remaining(deadline, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::CompensationRegime;
    use crate::models::LedgerDuration;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn totals(balance: &str, ot50: &str, ot100: &str) -> TotalsSnapshot {
        TotalsSnapshot {
            normal: LedgerDuration::parse("176:00"),
            absence: LedgerDuration::empty(),
            overtime_50: LedgerDuration::parse(ot50),
            overtime_100: LedgerDuration::parse(ot100),
            bank_credit: LedgerDuration::empty(),
            bank_debit: LedgerDuration::empty(),
            bank_balance: LedgerDuration::parse(balance),
        }
    }

    fn config() -> ComplianceConfig {
        ComplianceConfig {
            monthly_salary_base: dec("2200"),
            monthly_standard_hours: dec("220"),
            ..ComplianceConfig::default()
        }
    }

    #[test]
    fn test_critical_negative_balance() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let assessment = assess_compliance(
            &totals("-41:00", "00:00", "00:00"),
            "2025-02".parse().unwrap(),
            &config(),
            today,
        );
        assert_eq!(assessment.tier, RiskTier::Critico);
        assert_eq!(assessment.balance_hours, dec("-41"));
        assert_eq!(assessment.liability, Decimal::ZERO);
        assert_eq!(
            assessment.deadline,
            NaiveDate::from_ymd_opt(2025, 8, 31).unwrap()
        );
    }

    #[test]
    fn test_liability_uses_both_tiers() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let assessment = assess_compliance(
            &totals("15:00", "10:00", "05:00"),
            "2025-02".parse().unwrap(),
            &config(),
            today,
        );
        assert_eq!(assessment.tier, RiskTier::Normal);
        assert_eq!(assessment.liability, dec("340"));
    }

    #[test]
    fn test_collective_regime_extends_deadline() {
        let collective = ComplianceConfig {
            regime: CompensationRegime::Collective,
            ..config()
        };
        let today = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let assessment = assess_compliance(
            &totals("00:00", "00:00", "00:00"),
            "2025-01".parse().unwrap(),
            &collective,
            today,
        );
        assert_eq!(
            assessment.deadline,
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
        assert_eq!(assessment.days_remaining, 364);
    }

    #[test]
    fn test_wire_keys_are_camel_case() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let assessment = assess_compliance(
            &totals("-41:00", "00:00", "00:00"),
            "2025-02".parse().unwrap(),
            &config(),
            today,
        );
        let json = serde_json::to_value(&assessment).unwrap();
        assert_eq!(dec(json["balanceHours"].as_str().unwrap()), dec("-41"));
        assert_eq!(json["tier"], "critico");
        assert!(json.get("daysRemaining").is_some());
        assert!(json.get("days_remaining").is_none());

        let totals_json = serde_json::to_value(totals("-41:00", "01:00", "00:00")).unwrap();
        assert_eq!(totals_json["bankBalance"]["text"], "-41:00");
        assert_eq!(totals_json["overtime50"]["text"], "01:00");
    }
}
