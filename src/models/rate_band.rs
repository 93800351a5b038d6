//! Rate bands and banded rate tables.
//!
//! A [`RateTable`] is an ordered sequence of contiguous [`RateBand`]s that
//! covers every value from zero upwards. The same structure describes
//! income tax bands, National Insurance bands and the age bands used for
//! redundancy multipliers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A single band `[lower, upper)` with an associated rate.
///
/// An `upper` of `None` means the band is unbounded. For tax and National
/// Insurance tables the rate is a percentage; for redundancy age bands it is
/// a multiplier of weeks' pay per year of service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBand {
    /// Short name of the band (e.g. "basic", "higher").
    #[serde(default)]
    pub name: String,
    /// Inclusive lower bound.
    pub lower: Decimal,
    /// Exclusive upper bound, or `None` for an unbounded top band.
    #[serde(default)]
    pub upper: Option<Decimal>,
    /// The rate applying within this band.
    pub rate: Decimal,
}

impl RateBand {
    /// Returns true if `value` lies within `[lower, upper)`.
    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.lower && self.upper.is_none_or(|upper| value < upper)
    }

    /// Returns the part of `amount` that falls inside this band.
    pub fn portion_of(&self, amount: Decimal) -> Decimal {
        let top = match self.upper {
            Some(upper) => amount.min(upper),
            None => amount,
        };
        (top - self.lower).max(Decimal::ZERO)
    }
}

/// The portion of an amount that fell into one band, and the charge on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandPortion {
    /// The band name.
    pub name: String,
    /// The band's percentage rate.
    pub rate: Decimal,
    /// The part of the amount inside the band.
    pub portion: Decimal,
    /// `portion × rate / 100`, unrounded.
    pub amount: Decimal,
}

/// The result of applying a rate table to an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTableApplication {
    /// Bands that received a non-zero portion, lowest first.
    pub portions: Vec<BandPortion>,
    /// The sum of all band amounts, unrounded.
    pub total: Decimal,
}

/// An ordered, contiguous, exhaustive sequence of rate bands.
///
/// # Example
///
/// ```
/// use statutory_engine::models::{RateBand, RateTable};
/// use rust_decimal::Decimal;
///
/// let table = RateTable::new(vec![
///     RateBand { name: "nil".into(), lower: Decimal::ZERO, upper: Some(Decimal::from(100)), rate: Decimal::ZERO },
///     RateBand { name: "main".into(), lower: Decimal::from(100), upper: None, rate: Decimal::from(20) },
/// ]);
/// table.check("example").unwrap();
///
/// let applied = table.apply(Decimal::from(150));
/// assert_eq!(applied.total, Decimal::from(10));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(Vec<RateBand>);

impl RateTable {
    /// Creates a table from bands, which must already be in ascending order.
    pub fn new(bands: Vec<RateBand>) -> Self {
        Self(bands)
    }

    /// Returns the bands, lowest first.
    pub fn bands(&self) -> &[RateBand] {
        &self.0
    }

    /// Checks that the table starts at zero, has no gaps or overlaps and ends
    /// with a single unbounded band.
    ///
    /// `table` names the table in the returned error.
    pub fn check(&self, table: &str) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidRateTable {
            table: table.to_string(),
            message,
        };

        let first = self
            .0
            .first()
            .ok_or_else(|| invalid("table has no bands".to_string()))?;
        if !first.lower.is_zero() {
            return Err(invalid(format!(
                "first band starts at {} instead of 0",
                first.lower
            )));
        }

        for (index, band) in self.0.iter().enumerate() {
            let is_last = index + 1 == self.0.len();
            match band.upper {
                None if !is_last => {
                    return Err(invalid(format!(
                        "band '{}' is unbounded but is not the last band",
                        band.name
                    )));
                }
                None => {}
                Some(_) if is_last => {
                    return Err(invalid(format!(
                        "last band '{}' must be unbounded",
                        band.name
                    )));
                }
                Some(upper) => {
                    if upper <= band.lower {
                        return Err(invalid(format!(
                            "band '{}' has upper bound {} not above lower bound {}",
                            band.name, upper, band.lower
                        )));
                    }
                    let next = &self.0[index + 1];
                    if next.lower != upper {
                        return Err(invalid(format!(
                            "band '{}' ends at {} but band '{}' starts at {}",
                            band.name, upper, next.name, next.lower
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns the band containing `value`, if any.
    pub fn band_for(&self, value: Decimal) -> Option<&RateBand> {
        self.0.iter().find(|band| band.contains(value))
    }

    /// Applies the table's percentage rates to `amount`, band by band.
    ///
    /// Each band charges `max(0, min(amount, upper) − lower) × rate / 100`.
    pub fn apply(&self, amount: Decimal) -> RateTableApplication {
        let portions: Vec<BandPortion> = self
            .0
            .iter()
            .filter_map(|band| {
                let portion = band.portion_of(amount);
                if portion.is_zero() {
                    return None;
                }
                Some(BandPortion {
                    name: band.name.clone(),
                    rate: band.rate,
                    portion,
                    amount: portion * band.rate / Decimal::ONE_HUNDRED,
                })
            })
            .collect();

        let total = portions.iter().map(|p| p.amount).sum();
        RateTableApplication { portions, total }
    }
}
