//! Banked-hours risk classification.
//!
//! The absolute bank balance places an employee in one of three tiers.
//! Boundary values belong to the lower tier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Balance (in absolute hours) up to which an employee is `Normal`.
pub const ATTENTION_THRESHOLD_HOURS: Decimal = Decimal::from_parts(20, 0, 0, false, 0);

/// Balance (in absolute hours) up to which an employee is `Atencao`.
pub const CRITICAL_THRESHOLD_HOURS: Decimal = Decimal::from_parts(40, 0, 0, false, 0);

/// Compliance risk tier for a banked-hours balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// `|balance| <= 20`.
    Normal,
    /// `20 < |balance| <= 40`; needs attention.
    Atencao,
    /// `|balance| > 40`.
    Critico,
}

/// Classifies a signed balance by its absolute value.
///
/// # Examples
///
/// ```
/// use timesheet_sync::calculation::{classify_balance, RiskTier};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(classify_balance(Decimal::from(20)), RiskTier::Normal);
/// assert_eq!(classify_balance(Decimal::from_str("20.01").unwrap()), RiskTier::Atencao);
/// assert_eq!(classify_balance(Decimal::from(-45)), RiskTier::Critico);
/// ```
pub fn classify_balance(balance_hours: Decimal) -> RiskTier {
    let magnitude = balance_hours.abs();
    if magnitude <= ATTENTION_THRESHOLD_HOURS {
        RiskTier::Normal
    } else if magnitude <= CRITICAL_THRESHOLD_HOURS {
        RiskTier::Atencao
    } else {
        RiskTier::Critico
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_boundaries_belong_to_lower_tier() {
        assert_eq!(classify_balance(dec("20")), RiskTier::Normal);
        assert_eq!(classify_balance(dec("20.01")), RiskTier::Atencao);
        assert_eq!(classify_balance(dec("40")), RiskTier::Atencao);
        assert_eq!(classify_balance(dec("40.01")), RiskTier::Critico);
    }

    #[test]
    fn test_negative_balances_use_magnitude() {
        assert_eq!(classify_balance(dec("-20")), RiskTier::Normal);
        assert_eq!(classify_balance(dec("-25.5")), RiskTier::Atencao);
        assert_eq!(classify_balance(dec("-40.01")), RiskTier::Critico);
    }

    #[test]
    fn test_zero_is_normal() {
        assert_eq!(classify_balance(Decimal::ZERO), RiskTier::Normal);
    }

    #[test]
    fn test_serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&RiskTier::Atencao).unwrap(),
            "\"atencao\""
        );
        assert_eq!(
            serde_json::to_string(&RiskTier::Critico).unwrap(),
            "\"critico\""
        );
    }

    proptest! {
        #[test]
        fn prop_tier_never_decreases_with_magnitude(a in 0i64..10_000, b in 0i64..10_000) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            let low = Decimal::new(low, 2);
            let high = Decimal::new(high, 2);
            prop_assert!(classify_balance(low) <= classify_balance(high));
        }

        #[test]
        fn prop_sign_does_not_change_tier(cents in 0i64..10_000) {
            let value = Decimal::new(cents, 2);
            prop_assert_eq!(classify_balance(value), classify_balance(-value));
        }
    }
}
