//! Duration codec for the provider's signed `HH:MM` strings.
//!
//! The provider reports every ledger column as text such as `"08:00"` or
//! `"-02:30"`. A leading `-` negates the whole value; minutes are divided
//! by sixty and added to the whole hours.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Parses a signed `H:MM` / `HH:MM` string into decimal hours.
///
/// Missing or blank input is zero. An hour or minute component that does not
/// parse as an integer contributes zero rather than failing the whole value.
///
/// # Examples
///
/// ```
/// use timesheet_sync::calculation::parse_duration;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(parse_duration(Some("-02:30")), Decimal::from_str("-2.5").unwrap());
/// assert_eq!(parse_duration(Some("00:00")), Decimal::ZERO);
/// assert_eq!(parse_duration(Some("")), Decimal::ZERO);
/// assert_eq!(parse_duration(None), Decimal::ZERO);
/// ```
pub fn parse_duration(input: Option<&str>) -> Decimal {
    let Some(raw) = input.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Decimal::ZERO;
    };

    let (negative, body) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (hours_part, minutes_part) = body.split_once(':').unwrap_or((body, ""));

    let hours = parse_component(hours_part);
    let minutes = parse_component(minutes_part);
    let magnitude = hours + minutes / MINUTES_PER_HOUR;

    let value = if negative { -magnitude } else { magnitude };
    value.normalize()
}

fn parse_component(part: &str) -> Decimal {
    part.trim()
        .parse::<u64>()
        .map(Decimal::from)
        .unwrap_or(Decimal::ZERO)
}

/// Formats decimal hours as a signed `H:MM` string.
///
/// Fractions are rounded to the nearest minute, so only minute-aligned
/// values survive a `parse` / `format` round trip, and only when the input
/// was already in unpadded `H:MM` shape.
///
/// # Examples
///
/// ```
/// use timesheet_sync::calculation::{format_duration, parse_duration};
///
/// assert_eq!(format_duration(parse_duration(Some("-2:30"))), "-2:30");
/// assert_eq!(format_duration(parse_duration(Some("02:30"))), "2:30");
/// ```
pub fn format_duration(hours: Decimal) -> String {
    let total_minutes = (hours.abs() * MINUTES_PER_HOUR)
        .round()
        .to_u64()
        .unwrap_or(0);
    let sign = if hours.is_sign_negative() && total_minutes > 0 {
        "-"
    } else {
        ""
    };
    format!("{}{}:{:02}", sign, total_minutes / 60, total_minutes % 60)
}
