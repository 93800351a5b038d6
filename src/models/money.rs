//! Money rounding and calendar constants.
//!
//! Salary normalisation uses a 260 working-day year (52 weeks of 5 days).
//! Length-of-service arithmetic elsewhere works in calendar days.

use rust_decimal::{Decimal, RoundingStrategy};

/// Weeks in a salary year.
pub const WEEKS_PER_YEAR: Decimal = Decimal::from_parts(52, 0, 0, false, 0);

/// Months in a salary year.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Working days in a salary year.
pub const WORKING_DAYS_PER_YEAR: Decimal = Decimal::from_parts(260, 0, 0, false, 0);

/// Working days in a week.
pub const WORKING_DAYS_PER_WEEK: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Calendar days in a week.
pub const DAYS_PER_WEEK: Decimal = Decimal::from_parts(7, 0, 0, false, 0);

/// Rounds a monetary amount to pence, halves away from zero.
///
/// The result always carries two decimal places, so `25119.6` becomes `25119.60`.
///
/// # Example
///
/// ```
/// use statutory_engine::models::round_pence;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_pence(Decimal::from_str("165.625").unwrap()), Decimal::from_str("165.63").unwrap());
/// ```
pub fn round_pence(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Rounds a monetary amount to whole pounds, halves away from zero.
pub fn round_pounds(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a ratio or factor to four decimal places for display.
pub fn round_factor(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
}

/// Applies a percentage (e.g. `20` for 20%) to an amount.
pub fn apply_percentage(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_pence_midpoint_goes_up() {
        assert_eq!(round_pence(dec("0.005")), dec("0.01"));
        assert_eq!(round_pence(dec("1199.994")), dec("1199.99"));
    }

    #[test]
    fn test_round_pence_pads_to_two_places() {
        assert_eq!(round_pence(dec("25119.6")).to_string(), "25119.60");
        assert_eq!(round_pence(dec("3486")).to_string(), "3486.00");
    }

    #[test]
    fn test_round_pounds() {
        assert_eq!(round_pounds(dec("1199.5")), dec("1200"));
        assert_eq!(round_pounds(dec("1199.49")), dec("1199"));
    }

    #[test]
    fn test_round_factor() {
        assert_eq!(round_factor(dec("0.533333333")), dec("0.5333"));
        assert_eq!(round_factor(dec("0.857692307")), dec("0.8577"));
    }

    #[test]
    fn test_apply_percentage() {
        assert_eq!(apply_percentage(dec("6000"), dec("10")), dec("600"));
        assert_eq!(apply_percentage(dec("250"), dec("90")), dec("225"));
    }

    #[test]
    fn test_calendar_constants() {
        assert_eq!(WEEKS_PER_YEAR, dec("52"));
        assert_eq!(MONTHS_PER_YEAR, dec("12"));
        assert_eq!(WORKING_DAYS_PER_YEAR, WEEKS_PER_YEAR * WORKING_DAYS_PER_WEEK);
        assert_eq!(DAYS_PER_WEEK, dec("7"));
    }
}
