//! Financial projection of accrued overtime.
//!
//! The projected liability prices both overtime tiers at the hourly rate
//! implied by the configured monthly salary base, then loads employer
//! social charges and the severance fund on top.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::ComplianceConfig;

/// Pay multiplier for hours in the 50% overtime tier.
pub const OVERTIME_50_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Pay multiplier for hours in the 100% overtime tier.
pub const OVERTIME_100_MULTIPLIER: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Breakdown of a liability projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiabilityProjection {
    /// `monthly_salary_base / monthly_standard_hours`.
    pub hourly_rate: Decimal,
    /// Cost of the 50% tier before charges.
    pub overtime_50_cost: Decimal,
    /// Cost of the 100% tier before charges.
    pub overtime_100_cost: Decimal,
    /// `1 + employer_social_charge_rate + severance_fund_rate`.
    pub charges_multiplier: Decimal,
    /// Total projected liability, rounded to cents.
    pub total: Decimal,
}

/// Projects the monetary liability for the given overtime hours.
///
/// `liability = (h50 * rate * 1.5 + h100 * rate * 2.0) * (1 + social + severance)`
///
/// # Example
///
/// ```
/// use timesheet_sync::calculation::project_liability;
/// use timesheet_sync::config::ComplianceConfig;
/// use rust_decimal::Decimal;
///
/// let config = ComplianceConfig {
///     monthly_salary_base: Decimal::from(2200),
///     monthly_standard_hours: Decimal::from(220),
///     ..ComplianceConfig::default()
/// };
/// let projection = project_liability(Decimal::from(10), Decimal::from(5), &config);
/// assert_eq!(projection.hourly_rate, Decimal::from(10));
/// assert_eq!(projection.total, Decimal::from(340));
/// ```
pub fn project_liability(
    overtime_50_hours: Decimal,
    overtime_100_hours: Decimal,
    config: &ComplianceConfig,
) -> LiabilityProjection {
    let hourly_rate = config
        .monthly_salary_base
        .checked_div(config.monthly_standard_hours)
        .unwrap_or(Decimal::ZERO);

    let overtime_50_cost = overtime_50_hours * hourly_rate * OVERTIME_50_MULTIPLIER;
    let overtime_100_cost = overtime_100_hours * hourly_rate * OVERTIME_100_MULTIPLIER;
    let charges_multiplier =
        Decimal::ONE + config.employer_social_charge_rate + config.severance_fund_rate;

    let total = ((overtime_50_cost + overtime_100_cost) * charges_multiplier)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    LiabilityProjection {
        hourly_rate,
        overtime_50_cost,
        overtime_100_cost,
        charges_multiplier,
        total,
    }
}
