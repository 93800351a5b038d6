//! Configuration loading and management for the Statutory Calculation Engine.
//!
//! This module provides functionality to load per-tax-year statutory tables
//! from YAML files: tax and National Insurance bands, statutory pay caps and
//! thresholds, redundancy limits and pension qualifying-earnings limits.
//!
//! # Example
//!
//! ```no_run
//! use statutory_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/uk").unwrap();
//! let year = config.get_tax_year("2025-26").unwrap();
//! println!("Personal allowance: {}", year.income_tax.personal_allowance);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, IncomeTaxConfig, JurisdictionMetadata, MaternityConfig, PaternityConfig,
    PensionConfig, RedundancyConfig, StatutoryPayConfig, TaxYearConfig,
};
