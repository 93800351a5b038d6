//! Error types for the Statutory Calculation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading statutory tables
//! or running a calculation.

use chrono::NaiveDate;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// The main error type for the Statutory Calculation Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use statutory_engine::error::EngineError;
///
/// let error = EngineError::TaxYearNotFound {
///     tax_year: "2019-20".to_string(),
/// };
/// assert_eq!(error.to_string(), "Tax year not configured: 2019-20");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// One or more input fields failed validation.
    #[error("Validation failed: {errors}")]
    Validation {
        /// Every field that failed, with its message.
        errors: ValidationErrors,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A rate table in the configuration is not sorted, gapped or unbounded.
    #[error("Invalid rate table '{table}': {message}")]
    InvalidRateTable {
        /// The name of the table, e.g. `2025-26/income_tax`.
        table: String,
        /// A description of what is wrong with the table.
        message: String,
    },

    /// The requested tax year has no configuration.
    #[error("Tax year not configured: {tax_year}")]
    TaxYearNotFound {
        /// The tax year identifier that was requested.
        tax_year: String,
    },

    /// No configured tax year covers the given date.
    #[error("No tax year configured for date {date}")]
    NoTaxYearForDate {
        /// The date that was looked up.
        date: NaiveDate,
    },
}

impl EngineError {
    /// Returns the field errors if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            EngineError::Validation { errors } => Some(errors),
            _ => None,
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
