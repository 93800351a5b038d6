//! Income tax and National Insurance take-home estimate.
//!
//! Applies the tax year's personal allowance, income tax bands (rest of UK
//! or Scottish) and employee National Insurance bands to an annual gross
//! figure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{IncomeTaxConfig, TaxYearConfig};
use crate::error::EngineResult;
use crate::models::{
    AuditTrace, BandPortion, BreakdownLine, MONTHS_PER_YEAR, RateTableApplication,
    WEEKS_PER_YEAR, round_pence,
};
use crate::validation::{FieldValidator, Validate};

/// Which set of income tax bands applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegion {
    /// England, Wales and Northern Ireland.
    #[default]
    RestOfUk,
    /// Scottish taxpayers.
    Scotland,
}

impl std::fmt::Display for TaxRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxRegion::RestOfUk => write!(f, "rest of UK"),
            TaxRegion::Scotland => write!(f, "Scotland"),
        }
    }
}

/// Input to [`estimate_take_home`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeHomeInput {
    /// Annual gross pay.
    pub annual_gross: Decimal,
    /// Tax region.
    #[serde(default)]
    pub region: TaxRegion,
}

impl Validate for TakeHomeInput {
    fn validate(&self) -> EngineResult<()> {
        let mut v = FieldValidator::new();
        v.non_negative_amount("annual_gross", self.annual_gross);
        v.finish()
    }
}

/// An annual take-home pay estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeHomeEstimate {
    /// The tax year whose tables were used.
    pub tax_year: String,
    /// The tax region.
    pub region: TaxRegion,
    /// Annual gross income.
    pub gross_income: Decimal,
    /// Personal allowance after tapering.
    pub personal_allowance: Decimal,
    /// Income subject to income tax.
    pub taxable_income: Decimal,
    /// Annual income tax.
    pub income_tax: Decimal,
    /// Annual employee National Insurance.
    pub national_insurance: Decimal,
    /// Annual take-home pay.
    pub take_home_pay: Decimal,
    /// Take-home pay per month.
    pub monthly_take_home: Decimal,
    /// Take-home pay per week.
    pub weekly_take_home: Decimal,
    /// `(income_tax + national_insurance) / gross × 100`, to 2 decimal places.
    pub effective_tax_rate: Decimal,
    /// Income tax charged in each band.
    pub tax_bands: Vec<BandPortion>,
    /// National Insurance charged in each band.
    pub national_insurance_bands: Vec<BandPortion>,
    /// Line items.
    pub breakdown: Vec<BreakdownLine>,
    /// Plain-language summary.
    pub explanation: String,
    /// Rules applied.
    pub audit_trace: AuditTrace,
}

/// Returns the personal allowance for an income, tapered by £1 for every £2
/// of income above the taper threshold and never below zero.
///
/// # Example
///
/// ```
/// use statutory_engine::calculation::personal_allowance;
/// use statutory_engine::config::IncomeTaxConfig;
/// use statutory_engine::models::RateTable;
/// use rust_decimal::Decimal;
///
/// let config = IncomeTaxConfig {
///     personal_allowance: Decimal::from(12570),
///     allowance_taper_threshold: Decimal::from(100000),
///     rest_of_uk: RateTable::new(vec![]),
///     scotland: RateTable::new(vec![]),
/// };
/// assert_eq!(personal_allowance(Decimal::from(110000), &config), Decimal::from(7570));
/// ```
pub fn personal_allowance(gross: Decimal, config: &IncomeTaxConfig) -> Decimal {
    if gross <= config.allowance_taper_threshold {
        return config.personal_allowance;
    }
    let reduction = ((gross - config.allowance_taper_threshold) / Decimal::TWO).floor();
    (config.personal_allowance - reduction).max(Decimal::ZERO)
}

fn rounded_portions(application: &RateTableApplication) -> Vec<BandPortion> {
    application
        .portions
        .iter()
        .map(|p| BandPortion {
            amount: round_pence(p.amount),
            ..p.clone()
        })
        .collect()
}

/// Estimates annual take-home pay.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Validation`] if the gross is negative.
pub fn estimate_take_home(
    input: &TakeHomeInput,
    tax_year: &TaxYearConfig,
) -> EngineResult<TakeHomeEstimate> {
    input.validate()?;
    Ok(take_home_for(input.annual_gross, input.region, tax_year))
}

/// Computes the estimate for an already validated, non-negative gross.
pub(crate) fn take_home_for(
    gross: Decimal,
    region: TaxRegion,
    tax_year: &TaxYearConfig,
) -> TakeHomeEstimate {
    let config = &tax_year.income_tax;
    let mut trace = AuditTrace::default();

    let allowance = personal_allowance(gross, config);
    let tapered = allowance < config.personal_allowance;
    trace.record(
        "personal_allowance",
        "Personal Allowance",
        "Income Tax Act 2007 s.35",
        serde_json::json!({
            "gross_income": gross.to_string(),
            "standard_allowance": config.personal_allowance.to_string(),
            "taper_threshold": config.allowance_taper_threshold.to_string()
        }),
        serde_json::json!({
            "personal_allowance": allowance.to_string(),
            "tapered": tapered
        }),
        if tapered {
            format!(
                "Income £{} exceeds £{}: allowance reduced by £1 per £2 to £{}",
                gross, config.allowance_taper_threshold, allowance
            )
        } else {
            format!("Standard personal allowance of £{} applies", allowance)
        },
    );

    let taxable = (gross - allowance).max(Decimal::ZERO);
    let bands = match region {
        TaxRegion::RestOfUk => &config.rest_of_uk,
        TaxRegion::Scotland => &config.scotland,
    };
    let tax_application = bands.apply(taxable);
    let income_tax = round_pence(tax_application.total);
    trace.record(
        "income_tax_bands",
        "Income Tax Bands",
        match region {
            TaxRegion::RestOfUk => "Income Tax Act 2007 s.6",
            TaxRegion::Scotland => "Scotland Act 1998 s.80C",
        },
        serde_json::json!({
            "taxable_income": taxable.to_string(),
            "region": region
        }),
        serde_json::json!({
            "income_tax": income_tax.to_string(),
            "bands_used": tax_application.portions.len()
        }),
        format!(
            "£{} taxable income across {} {} band(s) = £{}",
            taxable,
            tax_application.portions.len(),
            region,
            income_tax
        ),
    );

    let ni_application = tax_year.national_insurance.apply(gross);
    let national_insurance = round_pence(ni_application.total);
    trace.record(
        "national_insurance",
        "Employee National Insurance",
        "Social Security Contributions and Benefits Act 1992 s.8",
        serde_json::json!({ "gross_income": gross.to_string() }),
        serde_json::json!({ "national_insurance": national_insurance.to_string() }),
        format!("Class 1 employee contributions on £{} = £{}", gross, national_insurance),
    );

    let take_home_pay = gross - income_tax - national_insurance;
    let effective_tax_rate = if gross.is_zero() {
        Decimal::ZERO
    } else {
        round_pence((income_tax + national_insurance) * Decimal::ONE_HUNDRED / gross)
    };

    let breakdown = vec![
        BreakdownLine::new("Gross income", round_pence(gross), "Annual gross pay"),
        BreakdownLine::new(
            "Income tax",
            income_tax,
            format!("After a £{} personal allowance", allowance),
        ),
        BreakdownLine::new(
            "National Insurance",
            national_insurance,
            "Class 1 employee contributions",
        ),
        BreakdownLine::new(
            "Take-home pay",
            round_pence(take_home_pay),
            "Gross less income tax and National Insurance",
        ),
    ];

    let explanation = format!(
        "On £{} a year ({}, {}), income tax is £{} and National Insurance is £{}, leaving £{} take-home pay (effective rate {}%).",
        round_pence(gross),
        region,
        tax_year.tax_year,
        income_tax,
        national_insurance,
        round_pence(take_home_pay),
        effective_tax_rate
    );

    debug!(
        tax_year = %tax_year.tax_year,
        region = %region,
        gross = %gross,
        income_tax = %income_tax,
        national_insurance = %national_insurance,
        "Take-home estimate calculated"
    );

    TakeHomeEstimate {
        tax_year: tax_year.tax_year.clone(),
        region,
        gross_income: round_pence(gross),
        personal_allowance: allowance,
        taxable_income: round_pence(taxable),
        income_tax,
        national_insurance,
        take_home_pay: round_pence(take_home_pay),
        monthly_take_home: round_pence(take_home_pay / MONTHS_PER_YEAR),
        weekly_take_home: round_pence(take_home_pay / WEEKS_PER_YEAR),
        effective_tax_rate,
        tax_bands: rounded_portions(&tax_application),
        national_insurance_bands: rounded_portions(&ni_application),
        breakdown,
        explanation,
        audit_trace: trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::{tax_year_2024_25, tax_year_2025_26};
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn estimate(gross: &str, region: TaxRegion) -> TakeHomeEstimate {
        estimate_take_home(
            &TakeHomeInput {
                annual_gross: dec(gross),
                region,
            },
            &tax_year_2025_26(),
        )
        .unwrap()
    }

    #[test]
    fn test_basic_rate_taxpayer_rest_of_uk() {
        let result = estimate("30000", TaxRegion::RestOfUk);

        assert_eq!(result.personal_allowance, dec("12570"));
        assert_eq!(result.taxable_income, dec("17430"));
        assert_eq!(result.income_tax, dec("3486"));
        assert_eq!(result.national_insurance, dec("1394.40"));
        assert_eq!(result.take_home_pay, dec("25119.60"));
        assert_eq!(result.monthly_take_home, dec("2093.30"));
        assert_eq!(result.effective_tax_rate, dec("16.27"));
    }

    #[test]
    fn test_scottish_bands_differ() {
        let result = estimate("30000", TaxRegion::Scotland);

        // 2827 × 19% + 12094 × 20% + 2509 × 21%
        assert_eq!(result.income_tax, dec("3482.82"));
        assert_eq!(result.tax_bands.len(), 3);
        assert_eq!(result.tax_bands[0].name, "starter");
        assert_eq!(result.tax_bands[2].name, "intermediate");
        assert_eq!(result.national_insurance, dec("1394.40"));
    }

    #[test]
    fn test_higher_rate_taxpayer() {
        let result = estimate("60000", TaxRegion::RestOfUk);

        // 37700 × 20% + (47430 - 37700) × 40% = 7540 + 3892
        assert_eq!(result.income_tax, dec("11432"));
        // 37700 × 8% + 9730 × 2%
        assert_eq!(result.national_insurance, dec("3210.60"));
    }

    #[test]
    fn test_allowance_tapers_above_100k() {
        let result = estimate("110000", TaxRegion::RestOfUk);

        assert_eq!(result.personal_allowance, dec("7570"));
        // 37700 × 20% + (102430 - 37700) × 40%
        assert_eq!(result.income_tax, dec("33432"));
        assert!(
            result
                .audit_trace
                .step("personal_allowance")
                .unwrap()
                .reasoning
                .contains("reduced")
        );
    }

    #[test]
    fn test_allowance_fully_withdrawn() {
        let result = estimate("130000", TaxRegion::RestOfUk);
        assert_eq!(result.personal_allowance, Decimal::ZERO);
        assert_eq!(result.taxable_income, dec("130000"));
        // 37700 × 20% + 87440 × 40% + 4860 × 45%
        assert_eq!(result.income_tax, dec("44703"));
    }

    #[test]
    fn test_income_below_allowance_pays_nothing() {
        let result = estimate("12000", TaxRegion::RestOfUk);
        assert_eq!(result.income_tax, Decimal::ZERO);
        assert_eq!(result.national_insurance, Decimal::ZERO);
        assert_eq!(result.take_home_pay, dec("12000"));
        assert!(result.tax_bands.is_empty());
    }

    #[test]
    fn test_zero_gross_has_zero_effective_rate() {
        let result = estimate("0", TaxRegion::Scotland);
        assert_eq!(result.effective_tax_rate, Decimal::ZERO);
        assert_eq!(result.take_home_pay, Decimal::ZERO);
    }

    #[test]
    fn test_negative_gross_is_rejected() {
        let result = estimate_take_home(
            &TakeHomeInput {
                annual_gross: dec("-1"),
                region: TaxRegion::RestOfUk,
            },
            &tax_year_2025_26(),
        );
        match result {
            Err(EngineError::Validation { errors }) => {
                assert_eq!(errors.get("annual_gross"), Some("cannot be negative"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_scottish_2024_25_starter_band_is_narrower() {
        let result = estimate_take_home(
            &TakeHomeInput {
                annual_gross: dec("30000"),
                region: TaxRegion::Scotland,
            },
            &tax_year_2024_25(),
        )
        .unwrap();

        assert_eq!(result.tax_year, "2024-25");
        assert_eq!(result.tax_bands[0].portion, dec("2306"));
    }

    #[test]
    fn test_breakdown_and_explanation() {
        let result = estimate("30000", TaxRegion::RestOfUk);
        let labels: Vec<&str> = result.breakdown.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Gross income", "Income tax", "National Insurance", "Take-home pay"]
        );
        assert!(result.explanation.contains("£25119.60"));
        assert_eq!(result.audit_trace.steps.len(), 3);
    }

    #[test]
    fn test_region_deserializes_snake_case() {
        let input: TakeHomeInput =
            serde_json::from_str(r#"{"annual_gross": "25000", "region": "scotland"}"#).unwrap();
        assert_eq!(input.region, TaxRegion::Scotland);

        let input: TakeHomeInput = serde_json::from_str(r#"{"annual_gross": "25000"}"#).unwrap();
        assert_eq!(input.region, TaxRegion::RestOfUk);
    }

    #[test]
    fn test_oversized_gross_rejected() {
        let result = estimate_take_home(
            &TakeHomeInput {
                annual_gross: Decimal::MAX,
                region: TaxRegion::Scotland,
            },
            &tax_year_2025_26(),
        );
        match result {
            Err(EngineError::Validation { errors }) => {
                assert_eq!(errors.get("annual_gross"), Some("cannot exceed 1000000000"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }
}
