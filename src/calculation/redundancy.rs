//! Statutory redundancy pay.
//!
//! Each year of service, counted backwards from the most recent, earns a
//! number of weeks' pay set by the employee's age during that year:
//!
//! | Age in the year | Weeks' pay |
//! |-----------------|------------|
//! | 41 and over     | 1.5        |
//! | 22 to 40        | 1.0        |
//! | 18 to 21        | 0.5        |
//! | under 18        | 0          |
//!
//! At most 20 years count, weekly pay is capped, and the result is scaled by
//! the ratio of actual to full-time hours. The bands, cap and limits come
//! from the tax year configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{RedundancyConfig, TaxYearConfig};
use crate::error::EngineResult;
use crate::models::{
    AuditTrace, BreakdownLine, ProRataRatio, round_factor, round_pence, round_pounds,
};
use crate::validation::{FieldValidator, Validate};

/// Service cannot start before this age.
const MINIMUM_WORKING_AGE: u32 = 15;
const MINIMUM_INPUT_AGE: Decimal = Decimal::from_parts(16, 0, 0, false, 0);
const MAXIMUM_INPUT_AGE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Input to [`calculate_redundancy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedundancyInput {
    /// Age at the date of redundancy.
    pub age: u32,
    /// Complete years of continuous service.
    pub years_of_service: u32,
    /// Gross weekly pay.
    pub weekly_wage: Decimal,
    /// Weekly hours actually worked.
    pub actual_hours: Decimal,
    /// Full-time weekly hours.
    pub full_time_hours: Decimal,
}

impl Validate for RedundancyInput {
    fn validate(&self) -> EngineResult<()> {
        let mut v = FieldValidator::new();
        let age_ok = v.in_range(
            "age",
            Decimal::from(self.age),
            MINIMUM_INPUT_AGE,
            MAXIMUM_INPUT_AGE,
        );
        if age_ok {
            let max_years = self.age - MINIMUM_WORKING_AGE;
            v.check(
                "years_of_service",
                self.years_of_service <= max_years,
                format!("cannot exceed {} years at age {}", max_years, self.age),
            );
        }
        v.amount("weekly_wage", self.weekly_wage);
        let full_time_ok = v.weekly_hours("full_time_hours", self.full_time_hours);
        if v.weekly_hours("actual_hours", self.actual_hours) && full_time_ok {
            v.check(
                "actual_hours",
                self.actual_hours <= self.full_time_hours,
                "cannot exceed full-time hours",
            );
        }
        v.finish()
    }
}

/// The entitlement earned in one year of service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceYear {
    /// 1 for the most recent year.
    pub year: u32,
    /// Age during that year.
    pub age: u32,
    /// Weeks' pay earned.
    pub weeks: Decimal,
    /// Pay for the year, rounded independently for display.
    pub amount: Decimal,
}

/// The result of a redundancy pay calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedundancyResult {
    /// The tax year whose limits were used.
    pub tax_year: String,
    /// Weekly pay after the statutory cap.
    pub capped_weekly_wage: Decimal,
    /// Whether the cap reduced the weekly pay.
    pub wage_capped: bool,
    /// `actual_hours / full_time_hours`, to 4 decimal places.
    pub pro_rata_multiplier: Decimal,
    /// Years counted towards the entitlement.
    pub years_counted: u32,
    /// Per-year entitlement, most recent year first.
    pub service_years: Vec<ServiceYear>,
    /// Sum of weeks' pay across counted years.
    pub total_statutory_weeks: Decimal,
    /// Whether the age and service qualifying conditions are met.
    pub eligible: bool,
    /// Total redundancy pay, rounded to the whole pound.
    pub total_pay: Decimal,
    /// Line items. Per-year lines are rounded separately and may not sum to
    /// `total_pay` exactly.
    pub breakdown: Vec<BreakdownLine>,
    /// Plain-language summary.
    pub explanation: String,
    /// Rules applied.
    pub audit_trace: AuditTrace,
}

/// Weeks' pay earned for a year of service at the given age.
///
/// # Example
///
/// ```
/// use statutory_engine::calculation::weeks_for_age;
/// use statutory_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let config = ConfigLoader::load("config/uk").unwrap();
/// let redundancy = &config.default_tax_year().unwrap().redundancy;
///
/// assert_eq!(weeks_for_age(41, redundancy), Decimal::from_str("1.5").unwrap());
/// assert_eq!(weeks_for_age(40, redundancy), Decimal::ONE);
/// ```
pub fn weeks_for_age(age: u32, config: &RedundancyConfig) -> Decimal {
    config
        .age_bands
        .band_for(Decimal::from(age))
        .map(|band| band.rate)
        .unwrap_or(Decimal::ZERO)
}

fn eligibility_warnings(input: &RedundancyInput, config: &RedundancyConfig, trace: &mut AuditTrace) -> bool {
    let mut eligible = true;
    if input.age < config.minimum_age {
        eligible = false;
        trace.warn(
            "below_minimum_age",
            format!(
                "Employees under {} are not normally entitled to statutory redundancy pay",
                config.minimum_age
            ),
            "medium",
        );
    }
    if input.years_of_service < config.minimum_years_of_service {
        eligible = false;
        trace.warn(
            "insufficient_service",
            format!(
                "At least {} years of continuous service are needed for statutory redundancy pay",
                config.minimum_years_of_service
            ),
            "medium",
        );
    }
    if !eligible {
        warn!(
            age = input.age,
            years_of_service = input.years_of_service,
            "Redundancy qualifying conditions not met"
        );
    }
    if input.years_of_service > config.max_years_of_service {
        trace.warn(
            "service_limited",
            format!(
                "Only the most recent {} years of service count",
                config.max_years_of_service
            ),
            "low",
        );
    }
    eligible
}

/// Calculates statutory redundancy pay.
///
/// Qualifying conditions (age and length of service) are reported as
/// warnings and never block the figures.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Validation`] when the age is outside
/// 16-100, service exceeds `age - 15` years, weekly pay is not positive, or the
/// hours are invalid.
///
/// # Example
///
/// ```
/// use statutory_engine::calculation::{calculate_redundancy, RedundancyInput};
/// use statutory_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let config = ConfigLoader::load("config/uk").unwrap();
/// let input = RedundancyInput {
///     age: 45,
///     years_of_service: 3,
///     weekly_wage: Decimal::from(500),
///     actual_hours: Decimal::from(20),
///     full_time_hours: Decimal::from_str("37.5").unwrap(),
/// };
///
/// let result = calculate_redundancy(&input, config.default_tax_year().unwrap()).unwrap();
/// assert_eq!(result.total_statutory_weeks, Decimal::from_str("4.5").unwrap());
/// assert_eq!(result.total_pay, Decimal::from(1200));
/// ```
pub fn calculate_redundancy(
    input: &RedundancyInput,
    tax_year: &TaxYearConfig,
) -> EngineResult<RedundancyResult> {
    input.validate()?;

    let config = &tax_year.redundancy;
    let mut trace = AuditTrace::default();

    let eligible = eligibility_warnings(input, config, &mut trace);

    let capped_wage = input.weekly_wage.min(config.weekly_wage_cap);
    let wage_capped = capped_wage < input.weekly_wage;
    trace.record(
        "weekly_pay_cap",
        "Weekly Pay Cap",
        "Employment Rights Act 1996 s.227",
        serde_json::json!({
            "weekly_wage": input.weekly_wage.to_string(),
            "cap": config.weekly_wage_cap.to_string()
        }),
        serde_json::json!({ "capped_weekly_wage": capped_wage.to_string() }),
        if wage_capped {
            format!(
                "Weekly pay of £{} is capped at £{}",
                round_pence(input.weekly_wage),
                round_pence(config.weekly_wage_cap)
            )
        } else {
            format!(
                "Weekly pay of £{} is within the £{} cap",
                round_pence(input.weekly_wage),
                round_pence(config.weekly_wage_cap)
            )
        },
    );

    let ratio = ProRataRatio::new(input.actual_hours, input.full_time_hours);
    let years_counted = input.years_of_service.min(config.max_years_of_service);

    let service_years: Vec<ServiceYear> = (1..=years_counted)
        .map(|year| {
            let age = input.age.saturating_sub(year - 1);
            let weeks = weeks_for_age(age, config);
            ServiceYear {
                year,
                age,
                weeks,
                amount: round_pence(ratio.apply(weeks * capped_wage)),
            }
        })
        .collect();
    let total_weeks: Decimal = service_years.iter().map(|y| y.weeks).sum();

    trace.record(
        "age_banded_weeks",
        "Age-Banded Weeks' Pay",
        "Employment Rights Act 1996 s.162",
        serde_json::json!({
            "age": input.age,
            "years_of_service": input.years_of_service,
            "years_counted": years_counted
        }),
        serde_json::json!({
            "weeks_by_year": service_years
                .iter()
                .map(|y| y.weeks.to_string())
                .collect::<Vec<_>>(),
            "total_weeks": total_weeks.to_string()
        }),
        format!(
            "{} years counted, earning {} weeks' pay in total",
            years_counted,
            total_weeks.normalize()
        ),
    );

    let total_pay = round_pounds(ratio.apply(total_weeks * capped_wage));
    trace.record(
        "redundancy_total",
        "Redundancy Pay Total",
        "Employment Rights Act 1996 s.162",
        serde_json::json!({
            "total_weeks": total_weeks.to_string(),
            "capped_weekly_wage": capped_wage.to_string(),
            "pro_rata_multiplier": round_factor(ratio.ratio()).to_string()
        }),
        serde_json::json!({ "total_pay": total_pay.to_string() }),
        format!(
            "{} weeks × £{} × {} = £{}",
            total_weeks.normalize(),
            round_pence(capped_wage),
            round_factor(ratio.ratio()),
            total_pay
        ),
    );

    let mut breakdown: Vec<BreakdownLine> = service_years
        .iter()
        .map(|y| {
            BreakdownLine::new(
                format!("Year {} (age {})", y.year, y.age),
                y.amount,
                format!("{} weeks' pay", y.weeks.normalize()),
            )
        })
        .collect();
    breakdown.push(BreakdownLine::new(
        "Total redundancy pay",
        total_pay,
        format!(
            "{} weeks × £{}{}",
            total_weeks.normalize(),
            round_pence(capped_wage),
            if ratio.is_full_time() {
                String::new()
            } else {
                format!(" × {} pro-rata", round_factor(ratio.ratio()))
            }
        ),
    ));

    let explanation = format!(
        "With {} counted years of service the entitlement is {} weeks' pay. At £{} a week{} this comes to £{}.",
        years_counted,
        total_weeks.normalize(),
        round_pence(capped_wage),
        if ratio.is_full_time() {
            String::new()
        } else {
            format!(" pro-rated by {}", round_factor(ratio.ratio()))
        },
        total_pay
    );

    debug!(
        tax_year = %tax_year.tax_year,
        total_weeks = %total_weeks,
        total_pay = %total_pay,
        "Redundancy pay calculated"
    );

    Ok(RedundancyResult {
        tax_year: tax_year.tax_year.clone(),
        capped_weekly_wage: round_pence(capped_wage),
        wage_capped,
        pro_rata_multiplier: round_factor(ratio.ratio()),
        years_counted,
        service_years,
        total_statutory_weeks: total_weeks,
        eligible,
        total_pay,
        breakdown,
        explanation,
        audit_trace: trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::{tax_year_2024_25, tax_year_2025_26};
    use crate::error::EngineError;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn full_time(age: u32, years: u32, wage: &str) -> RedundancyInput {
        RedundancyInput {
            age,
            years_of_service: years,
            weekly_wage: dec(wage),
            actual_hours: dec("37.5"),
            full_time_hours: dec("37.5"),
        }
    }

    fn calculate(input: &RedundancyInput) -> RedundancyResult {
        calculate_redundancy(input, &tax_year_2025_26()).unwrap()
    }

    #[test]
    fn test_part_time_scenario() {
        let input = RedundancyInput {
            actual_hours: dec("20"),
            ..full_time(45, 3, "500")
        };
        let result = calculate(&input);

        let rates: Vec<Decimal> = result.service_years.iter().map(|y| y.weeks).collect();
        assert_eq!(rates, vec![dec("1.5"), dec("1.5"), dec("1.5")]);
        let ages: Vec<u32> = result.service_years.iter().map(|y| y.age).collect();
        assert_eq!(ages, vec![45, 44, 43]);
        assert_eq!(result.total_statutory_weeks, dec("4.5"));
        assert_eq!(result.pro_rata_multiplier, dec("0.5333"));
        assert_eq!(result.total_pay, dec("1200"));
        assert!(result.eligible);
    }

    #[test]
    fn test_age_band_boundaries() {
        let config = &tax_year_2025_26().redundancy;
        assert_eq!(weeks_for_age(41, config), dec("1.5"));
        assert_eq!(weeks_for_age(40, config), dec("1.0"));
        assert_eq!(weeks_for_age(22, config), dec("1.0"));
        assert_eq!(weeks_for_age(21, config), dec("0.5"));
        assert_eq!(weeks_for_age(18, config), dec("0.5"));
        assert_eq!(weeks_for_age(17, config), Decimal::ZERO);
    }

    #[test]
    fn test_service_crossing_age_bands() {
        let result = calculate(&full_time(42, 4, "400"));
        let rates: Vec<Decimal> = result.service_years.iter().map(|y| y.weeks).collect();

        // Ages 42, 41, 40, 39.
        assert_eq!(rates, vec![dec("1.5"), dec("1.5"), dec("1"), dec("1")]);
        assert_eq!(result.total_statutory_weeks, dec("5"));
        assert_eq!(result.total_pay, dec("2000"));
    }

    #[test]
    fn test_weekly_wage_capped() {
        let result = calculate(&full_time(30, 5, "1000"));

        assert!(result.wage_capped);
        assert_eq!(result.capped_weekly_wage, dec("719"));
        assert_eq!(result.total_pay, dec("3595"));
    }

    #[test]
    fn test_previous_year_cap() {
        let result = calculate_redundancy(&full_time(30, 5, "1000"), &tax_year_2024_25()).unwrap();
        assert_eq!(result.capped_weekly_wage, dec("700"));
        assert_eq!(result.total_pay, dec("3500"));
    }

    #[test]
    fn test_only_twenty_years_count() {
        let result = calculate(&full_time(65, 30, "500"));

        assert_eq!(result.years_counted, 20);
        assert_eq!(result.service_years.len(), 20);
        assert_eq!(result.total_statutory_weeks, dec("30"));
        assert_eq!(result.total_pay, dec("15000"));
        assert!(result.audit_trace.has_warning("service_limited"));
    }

    #[test]
    fn test_short_service_warns_but_still_calculates() {
        let result = calculate(&full_time(30, 1, "500"));

        assert!(!result.eligible);
        assert!(result.audit_trace.has_warning("insufficient_service"));
        assert_eq!(result.total_pay, dec("500"));
    }

    #[test]
    fn test_young_employee_warns() {
        let result = calculate(&full_time(17, 2, "300"));

        assert!(!result.eligible);
        assert!(result.audit_trace.has_warning("below_minimum_age"));
        assert_eq!(result.total_pay, Decimal::ZERO);
    }

    #[test]
    fn test_display_rounding_drift_is_preserved() {
        let result = calculate(&full_time(30, 3, "333.33"));

        let line_sum: Decimal = result.service_years.iter().map(|y| y.amount).sum();
        assert_eq!(line_sum, dec("999.99"));
        assert_eq!(result.total_pay, dec("1000"));
    }

    #[test]
    fn test_service_longer_than_working_life_rejected() {
        match calculate_redundancy(&full_time(20, 6, "500"), &tax_year_2025_26()) {
            Err(EngineError::Validation { errors }) => {
                assert_eq!(
                    errors.get("years_of_service"),
                    Some("cannot exceed 5 years at age 20")
                );
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_inputs_reported_together() {
        let input = RedundancyInput {
            age: 101,
            years_of_service: 2,
            weekly_wage: Decimal::ZERO,
            actual_hours: dec("40"),
            full_time_hours: dec("37.5"),
        };
        match calculate_redundancy(&input, &tax_year_2025_26()) {
            Err(EngineError::Validation { errors }) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.contains("age"));
                assert!(errors.contains("weekly_wage"));
                assert_eq!(errors.get("actual_hours"), Some("cannot exceed full-time hours"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_weekly_wage_rejected() {
        let input = full_time(45, 10, "1");
        let input = RedundancyInput {
            weekly_wage: Decimal::MAX,
            ..input
        };
        match calculate_redundancy(&input, &tax_year_2025_26()) {
            Err(EngineError::Validation { errors }) => {
                assert_eq!(errors.get("weekly_wage"), Some("cannot exceed 1000000000"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_capped_wage_never_exceeds_cap(
            wage_pence in 1i64..1_000_000i64,
            years in 0u32..=30u32,
        ) {
            let year = tax_year_2025_26();
            let cap = year.redundancy.weekly_wage_cap;
            let input = full_time(60, years.min(45), &Decimal::new(wage_pence, 2).to_string());
            let result = calculate_redundancy(&input, &year).unwrap();

            prop_assert!(result.capped_weekly_wage <= cap);
            prop_assert!(result.total_pay <= round_pounds(cap * dec("30")));
        }
    }
}
