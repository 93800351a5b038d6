//! Configuration types for statutory calculations.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every statutory constant
//! the calculators use lives in a [`TaxYearConfig`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::models::RateTable;

/// Metadata about the jurisdiction the tables describe.
#[derive(Debug, Clone, Deserialize)]
pub struct JurisdictionMetadata {
    /// Short jurisdiction code (e.g. "UK").
    pub code: String,
    /// Human-readable name.
    pub name: String,
    /// Version of the configuration set.
    pub version: String,
    /// URL of the official source for the rates.
    pub source_url: String,
    /// The tax year used when a caller does not choose one.
    pub default_tax_year: String,
}

/// Income tax tables for a tax year.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomeTaxConfig {
    /// The standard personal allowance.
    pub personal_allowance: Decimal,
    /// Income above which the personal allowance is reduced by £1 for every £2.
    pub allowance_taper_threshold: Decimal,
    /// Bands for England, Wales and Northern Ireland, over taxable income.
    pub rest_of_uk: RateTable,
    /// Bands for Scottish taxpayers, over taxable income.
    pub scotland: RateTable,
}

/// Maternity pay tier lengths.
#[derive(Debug, Clone, Deserialize)]
pub struct MaternityConfig {
    /// Weeks paid at the uncapped earnings-related rate.
    pub higher_rate_weeks: u32,
    /// Weeks paid at the lower of the cap and the earnings-related rate.
    pub standard_rate_weeks: u32,
}

/// Paternity pay limits.
#[derive(Debug, Clone, Deserialize)]
pub struct PaternityConfig {
    /// The most weeks that may be claimed.
    pub max_weeks: u32,
}

/// Statutory maternity and paternity pay constants.
#[derive(Debug, Clone, Deserialize)]
pub struct StatutoryPayConfig {
    /// The weekly flat-rate cap.
    pub weekly_cap: Decimal,
    /// Minimum average weekly earnings to qualify (the Lower Earnings Limit).
    pub lower_earnings_limit: Decimal,
    /// Percentage of average weekly earnings paid (90).
    pub earnings_rate: Decimal,
    /// Weeks before the expected week of childbirth that the qualifying week falls.
    pub qualifying_weeks_before_birth: u32,
    /// Continuous employment required by the qualifying week, in weeks.
    pub minimum_weeks_employed: u32,
    /// Number of trailing weeks averaged for variable pay.
    pub variable_pay_weeks: usize,
    /// Maternity tiering.
    pub maternity: MaternityConfig,
    /// Paternity limits.
    pub paternity: PaternityConfig,
}

/// Statutory redundancy pay constants.
#[derive(Debug, Clone, Deserialize)]
pub struct RedundancyConfig {
    /// Maximum weekly pay counted.
    pub weekly_wage_cap: Decimal,
    /// Maximum years of service counted.
    pub max_years_of_service: u32,
    /// Years of service needed for entitlement.
    pub minimum_years_of_service: u32,
    /// Minimum age for entitlement.
    pub minimum_age: u32,
    /// Weeks' pay per year of service, banded by age in that year.
    pub age_bands: RateTable,
}

/// Workplace pension auto-enrolment constants.
#[derive(Debug, Clone, Deserialize)]
pub struct PensionConfig {
    /// Lower limit of qualifying earnings.
    pub qualifying_earnings_lower: Decimal,
    /// Upper limit of qualifying earnings.
    pub qualifying_earnings_upper: Decimal,
    /// Annual earnings at which auto-enrolment applies.
    pub earnings_trigger: Decimal,
    /// Youngest age for auto-enrolment.
    pub minimum_age: u32,
    /// Oldest age for auto-enrolment (state pension age).
    pub maximum_age: u32,
    /// Minimum employee contribution percentage.
    pub minimum_employee_rate: Decimal,
    /// Minimum employer contribution percentage.
    pub minimum_employer_rate: Decimal,
    /// Minimum total contribution percentage.
    pub minimum_total_rate: Decimal,
}

/// Every statutory constant for one tax year.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxYearConfig {
    /// Tax year identifier, e.g. "2025-26".
    pub tax_year: String,
    /// The first day of the tax year (6 April).
    pub starts_on: NaiveDate,
    /// Income tax tables.
    pub income_tax: IncomeTaxConfig,
    /// Employee Class 1 National Insurance bands over annual earnings.
    pub national_insurance: RateTable,
    /// Maternity and paternity pay.
    pub statutory_pay: StatutoryPayConfig,
    /// Redundancy pay.
    pub redundancy: RedundancyConfig,
    /// Pension auto-enrolment.
    pub pension: PensionConfig,
}

impl TaxYearConfig {
    /// Checks every rate table in the year for gaps, overlaps and bounds.
    pub fn check(&self) -> EngineResult<()> {
        let name = |table: &str| format!("{}/{}", self.tax_year, table);
        self.income_tax
            .rest_of_uk
            .check(&name("income_tax.rest_of_uk"))?;
        self.income_tax.scotland.check(&name("income_tax.scotland"))?;
        self.national_insurance.check(&name("national_insurance"))?;
        self.redundancy
            .age_bands
            .check(&name("redundancy.age_bands"))?;

        let pension = &self.pension;
        if pension.qualifying_earnings_lower > pension.qualifying_earnings_upper {
            return Err(EngineError::InvalidRateTable {
                table: name("pension"),
                message: format!(
                    "qualifying earnings lower limit {} exceeds upper limit {}",
                    pension.qualifying_earnings_lower, pension.qualifying_earnings_upper
                ),
            });
        }
        Ok(())
    }
}

/// The complete configuration loaded from YAML files.
///
/// Tax years are held sorted oldest first.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    metadata: JurisdictionMetadata,
    tax_years: Vec<TaxYearConfig>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(metadata: JurisdictionMetadata, tax_years: Vec<TaxYearConfig>) -> Self {
        let mut sorted = tax_years;
        sorted.sort_by(|a, b| a.starts_on.cmp(&b.starts_on));
        Self {
            metadata,
            tax_years: sorted,
        }
    }

    /// Returns the jurisdiction metadata.
    pub fn jurisdiction(&self) -> &JurisdictionMetadata {
        &self.metadata
    }

    /// Returns all tax years, oldest first.
    pub fn tax_years(&self) -> &[TaxYearConfig] {
        &self.tax_years
    }
}
