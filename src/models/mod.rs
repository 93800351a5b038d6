//! Core data models for the Statutory Calculation Engine.
//!
//! This module contains the value records shared by every calculator:
//! rate bands, date spans, pro-rata ratios, money helpers and the audit
//! records attached to each result.

mod calculation_result;
mod money;
mod period_span;
mod pro_rata_ratio;
mod rate_band;

pub use calculation_result::{AuditStep, AuditTrace, AuditWarning, BreakdownLine};
pub use money::{
    DAYS_PER_WEEK, MONTHS_PER_YEAR, WEEKS_PER_YEAR, WORKING_DAYS_PER_WEEK,
    WORKING_DAYS_PER_YEAR, apply_percentage, round_factor, round_pence, round_pounds,
};
pub use period_span::{PeriodSpan, ServiceLength};
pub use pro_rata_ratio::ProRataRatio;
pub use rate_band::{BandPortion, RateBand, RateTable, RateTableApplication};
