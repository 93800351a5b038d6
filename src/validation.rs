//! Field-level input validation.
//!
//! Every calculator validates its input in a separate pass before any
//! arithmetic runs. Failures are collected per field so that all problems
//! with an input are reported together, and any failure gates the whole
//! calculation.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::WEEKS_PER_YEAR;

/// The maximum number of hours in a week.
pub const HOURS_PER_WEEK_LIMIT: Decimal = Decimal::from_parts(168, 0, 0, false, 0);

/// The smallest positive amount, hours or weeks accepted for any input field.
pub const MINIMUM_QUANTITY: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// The largest monetary amount accepted for any input field (£1bn).
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// A mapping from input field name to the first error message for that field.
///
/// # Example
///
/// ```
/// use statutory_engine::validation::ValidationErrors;
///
/// let mut errors = ValidationErrors::new();
/// errors.add("full_time_hours", "must be greater than 0");
/// assert_eq!(errors.get("full_time_hours"), Some("must be greater than 0"));
/// assert_eq!(errors.to_string(), "full_time_hours: must be greater than 0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    /// Creates an empty error collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error for a field. The first message recorded for a field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Returns the message recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Returns true if an error was recorded for the field.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Returns true if no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields with errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Implemented by every calculator input.
pub trait Validate {
    /// Checks every field and returns [`EngineError::Validation`] listing all
    /// failures, or `Ok(())` when the input is safe to calculate with.
    fn validate(&self) -> EngineResult<()>;
}

/// Accumulates field errors while an input is being checked.
///
/// Each check returns `true` when it passed so callers can skip dependent
/// checks (for example, comparing two hour fields only when both are valid).
#[derive(Debug, Default)]
pub struct FieldValidator {
    errors: ValidationErrors,
}

impl FieldValidator {
    /// Creates a validator with no recorded errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` against `field` unless `condition` holds.
    pub fn check(&mut self, field: &str, condition: bool, message: impl Into<String>) -> bool {
        if !condition {
            self.errors.add(field, message);
        }
        condition
    }

    /// Requires `value > 0`.
    pub fn positive(&mut self, field: &str, value: Decimal) -> bool {
        self.check(field, value > Decimal::ZERO, "must be greater than 0")
    }

    /// Requires `value >= 0`.
    pub fn non_negative(&mut self, field: &str, value: Decimal) -> bool {
        self.check(field, value >= Decimal::ZERO, "cannot be negative")
    }

    /// Requires `min <= value <= max`.
    pub fn in_range(&mut self, field: &str, value: Decimal, min: Decimal, max: Decimal) -> bool {
        self.check(
            field,
            value >= min && value <= max,
            format!("must be between {} and {}", min, max),
        )
    }

    /// Requires `0 < value <= 100`.
    pub fn percentage(&mut self, field: &str, value: Decimal) -> bool {
        self.check(
            field,
            value > Decimal::ZERO && value <= Decimal::ONE_HUNDRED,
            "must be greater than 0 and at most 100",
        )
    }

    /// Requires `0.01 <= hours <= 168`.
    pub fn weekly_hours(&mut self, field: &str, hours: Decimal) -> bool {
        if !self.quantity(field, hours) {
            return false;
        }
        self.check(
            field,
            hours <= HOURS_PER_WEEK_LIMIT,
            format!("cannot exceed {} hours per week", HOURS_PER_WEEK_LIMIT),
        )
    }

    /// Requires `value > 0` and no smaller than [`MINIMUM_QUANTITY`].
    pub fn quantity(&mut self, field: &str, value: Decimal) -> bool {
        self.positive(field, value)
            && self.check(
                field,
                value >= MINIMUM_QUANTITY,
                format!("must be at least {}", MINIMUM_QUANTITY),
            )
    }

    /// Requires `0.01 <= value <= AMOUNT_LIMIT`.
    pub fn amount(&mut self, field: &str, value: Decimal) -> bool {
        self.quantity(field, value) && self.within_amount_limit(field, value)
    }

    /// Requires `0 <= value <= AMOUNT_LIMIT`.
    pub fn non_negative_amount(&mut self, field: &str, value: Decimal) -> bool {
        self.non_negative(field, value) && self.within_amount_limit(field, value)
    }

    /// Requires `value <= 52` weeks.
    pub fn weeks_in_year(&mut self, field: &str, value: Decimal) -> bool {
        self.check(
            field,
            value <= WEEKS_PER_YEAR,
            format!("cannot exceed {} weeks", WEEKS_PER_YEAR),
        )
    }

    fn within_amount_limit(&mut self, field: &str, value: Decimal) -> bool {
        self.check(
            field,
            value <= AMOUNT_LIMIT,
            format!("cannot exceed {}", AMOUNT_LIMIT),
        )
    }

    /// Requires an optional value to be present, returning it when it is.
    pub fn required<T: Copy>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.errors.add(field, "is required");
        }
        value
    }

    /// Returns true if an error has already been recorded for `field`.
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains(field)
    }

    /// Finishes validation.
    ///
    /// Returns `Ok(())` if no errors were recorded, otherwise
    /// [`EngineError::Validation`] carrying every field error.
    pub fn finish(self) -> EngineResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation {
                errors: self.errors,
            })
        }
    }

    /// Finishes validation, handing back `value` when nothing failed.
    ///
    /// `value` is normally built from [`FieldValidator::required`] results, so
    /// it is `None` exactly when a required field was missing and an error
    /// has already been recorded for it.
    pub fn finish_with<T>(mut self, value: Option<T>) -> EngineResult<T> {
        match value {
            Some(value) if self.errors.is_empty() => Ok(value),
            Some(_) => Err(EngineError::Validation {
                errors: self.errors,
            }),
            None => {
                if self.errors.is_empty() {
                    self.errors.add("input", "is incomplete");
                }
                Err(EngineError::Validation {
                    errors: self.errors,
                })
            }
        }
    }
}
