//! The ratio of actual hours to full-time hours.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A pro-rata ratio of `actual_hours / full_time_hours`.
///
/// Inputs are validated before a ratio is built, so `full_time_hours` is
/// expected to be positive. A zero denominator yields a zero ratio rather
/// than a division panic.
///
/// # Example
///
/// ```
/// use statutory_engine::models::ProRataRatio;
/// use rust_decimal::Decimal;
///
/// let ratio = ProRataRatio::new(Decimal::from(20), Decimal::from(40));
/// assert_eq!(ratio.percentage(), Decimal::from(50));
/// assert_eq!(ratio.apply(Decimal::from(10000)), Decimal::from(5000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProRataRatio {
    /// Hours actually worked per week.
    pub actual_hours: Decimal,
    /// Full-time hours per week.
    pub full_time_hours: Decimal,
}

impl ProRataRatio {
    /// Creates a ratio from hours.
    pub fn new(actual_hours: Decimal, full_time_hours: Decimal) -> Self {
        Self {
            actual_hours,
            full_time_hours,
        }
    }

    /// Creates a ratio from a percentage of full-time hours.
    pub fn from_percentage(percentage: Decimal, full_time_hours: Decimal) -> Self {
        Self {
            actual_hours: full_time_hours * percentage / Decimal::ONE_HUNDRED,
            full_time_hours,
        }
    }

    /// Returns `actual_hours / full_time_hours`.
    pub fn ratio(&self) -> Decimal {
        if self.full_time_hours.is_zero() {
            return Decimal::ZERO;
        }
        self.actual_hours / self.full_time_hours
    }

    /// Returns the ratio as a percentage.
    pub fn percentage(&self) -> Decimal {
        if self.full_time_hours.is_zero() {
            return Decimal::ZERO;
        }
        self.actual_hours * Decimal::ONE_HUNDRED / self.full_time_hours
    }

    /// Scales a full-time amount by the ratio.
    ///
    /// Multiplies before dividing so that exact results such as
    /// `1500 × 20 / 37.5 = 800` stay exact.
    pub fn apply(&self, amount: Decimal) -> Decimal {
        if self.full_time_hours.is_zero() {
            return Decimal::ZERO;
        }
        amount * self.actual_hours / self.full_time_hours
    }

    /// Returns true when actual hours are at least full-time hours.
    pub fn is_full_time(&self) -> bool {
        self.actual_hours >= self.full_time_hours
    }
}
