//! Pro-rata salary conversion.
//!
//! Converts a full-time salary quoted at any frequency into full-time and
//! pro-rata equivalents at yearly, monthly, weekly, daily and hourly
//! granularity, then estimates take-home pay on the pro-rata salary.
//!
//! ## Calendar constants
//!
//! - yearly ×1, monthly ×12, weekly ×52, daily ×260 (5 working days × 52 weeks)
//! - hourly = weekly ÷ full-time weekly hours

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TaxYearConfig;
use crate::error::EngineResult;
use crate::models::{
    AuditTrace, BreakdownLine, MONTHS_PER_YEAR, ProRataRatio, WEEKS_PER_YEAR,
    WORKING_DAYS_PER_YEAR, round_factor, round_pence,
};
use crate::validation::{FieldValidator, Validate};

use super::income_tax::{TakeHomeEstimate, TaxRegion, take_home_for};

/// How often the full-time salary is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryFrequency {
    /// Per year.
    Yearly,
    /// Per month.
    Monthly,
    /// Per week.
    Weekly,
    /// Per working day.
    Daily,
}

impl SalaryFrequency {
    /// Number of periods of this frequency in a salary year.
    pub fn periods_per_year(self) -> Decimal {
        match self {
            SalaryFrequency::Yearly => Decimal::ONE,
            SalaryFrequency::Monthly => MONTHS_PER_YEAR,
            SalaryFrequency::Weekly => WEEKS_PER_YEAR,
            SalaryFrequency::Daily => WORKING_DAYS_PER_YEAR,
        }
    }
}

impl std::fmt::Display for SalaryFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SalaryFrequency::Yearly => write!(f, "yearly"),
            SalaryFrequency::Monthly => write!(f, "monthly"),
            SalaryFrequency::Weekly => write!(f, "weekly"),
            SalaryFrequency::Daily => write!(f, "daily"),
        }
    }
}

/// How the part-time share is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProRataBasis {
    /// Actual weekly hours worked.
    Hours {
        /// Hours worked per week.
        actual_hours: Decimal,
    },
    /// A percentage of full-time.
    Percentage {
        /// Percentage of full-time, in (0, 100].
        percentage: Decimal,
    },
}

/// Input to [`calculate_pro_rata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProRataInput {
    /// The full-time salary, quoted at `frequency`.
    pub full_time_salary: Decimal,
    /// How often `full_time_salary` is paid.
    pub frequency: SalaryFrequency,
    /// Full-time weekly hours.
    pub full_time_hours: Decimal,
    /// The part-time share.
    pub basis: ProRataBasis,
    /// Tax region for the take-home estimate.
    #[serde(default)]
    pub tax_region: TaxRegion,
}

impl Validate for ProRataInput {
    fn validate(&self) -> EngineResult<()> {
        let mut v = FieldValidator::new();
        v.amount("full_time_salary", self.full_time_salary);
        let full_time_ok = v.weekly_hours("full_time_hours", self.full_time_hours);

        match self.basis {
            ProRataBasis::Hours { actual_hours } => {
                if v.weekly_hours("actual_hours", actual_hours) && full_time_ok {
                    v.check(
                        "actual_hours",
                        actual_hours <= self.full_time_hours,
                        "cannot exceed full-time hours",
                    );
                }
            }
            ProRataBasis::Percentage { percentage } => {
                v.percentage("percentage", percentage);
            }
        }

        v.finish()
    }
}

/// A salary expressed at every granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryAmounts {
    /// Per year.
    pub yearly: Decimal,
    /// Per month.
    pub monthly: Decimal,
    /// Per week.
    pub weekly: Decimal,
    /// Per working day.
    pub daily: Decimal,
    /// Per full-time hour.
    pub hourly: Decimal,
}

impl SalaryAmounts {
    fn from_annual(annual: Decimal, full_time_hours: Decimal) -> Self {
        let weekly = annual / WEEKS_PER_YEAR;
        Self {
            yearly: annual,
            monthly: annual / MONTHS_PER_YEAR,
            weekly,
            daily: annual / WORKING_DAYS_PER_YEAR,
            hourly: weekly / full_time_hours,
        }
    }

    fn scaled(&self, ratio: &ProRataRatio) -> Self {
        Self {
            yearly: ratio.apply(self.yearly),
            monthly: ratio.apply(self.monthly),
            weekly: ratio.apply(self.weekly),
            daily: ratio.apply(self.daily),
            hourly: ratio.apply(self.hourly),
        }
    }

    fn rounded(&self) -> Self {
        Self {
            yearly: round_pence(self.yearly),
            monthly: round_pence(self.monthly),
            weekly: round_pence(self.weekly),
            daily: round_pence(self.daily),
            hourly: round_pence(self.hourly),
        }
    }
}

/// The result of a pro-rata conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProRataResult {
    /// The tax year used for the take-home estimate.
    pub tax_year: String,
    /// `actual_hours / full_time_hours`, to 4 decimal places.
    pub ratio: Decimal,
    /// The ratio as a percentage, to 2 decimal places.
    pub percentage: Decimal,
    /// Actual weekly hours (implied from the percentage when given as one).
    pub actual_hours: Decimal,
    /// Full-time weekly hours.
    pub full_time_hours: Decimal,
    /// The full-time salary at every granularity.
    pub full_time: SalaryAmounts,
    /// The pro-rata share of each full-time figure.
    pub pro_rata: SalaryAmounts,
    /// Pay per hour actually worked, identical for full-time and pro-rata.
    pub hourly_rate: Decimal,
    /// The pro-rata annual salary.
    pub total: Decimal,
    /// Income tax and National Insurance on the pro-rata annual salary.
    pub take_home: TakeHomeEstimate,
    /// Line items.
    pub breakdown: Vec<BreakdownLine>,
    /// Plain-language summary.
    pub explanation: String,
    /// Rules applied.
    pub audit_trace: AuditTrace,
}

/// Converts a full-time salary into its pro-rata equivalents.
///
/// Every pro-rata amount is exactly `ratio × full-time amount` before
/// rounding to pence.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Validation`] for a non-positive
/// salary or hours, actual hours above full-time, full-time hours above 168,
/// or a percentage outside (0, 100].
///
/// # Example
///
/// ```
/// use statutory_engine::calculation::{calculate_pro_rata, ProRataBasis, ProRataInput, SalaryFrequency, TaxRegion};
/// use statutory_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("config/uk").unwrap();
/// let input = ProRataInput {
///     full_time_salary: Decimal::from(30000),
///     frequency: SalaryFrequency::Yearly,
///     full_time_hours: Decimal::from(40),
///     basis: ProRataBasis::Hours { actual_hours: Decimal::from(20) },
///     tax_region: TaxRegion::RestOfUk,
/// };
///
/// let result = calculate_pro_rata(&input, config.default_tax_year().unwrap()).unwrap();
/// assert_eq!(result.pro_rata.yearly, Decimal::from(15000));
/// ```
pub fn calculate_pro_rata(
    input: &ProRataInput,
    tax_year: &TaxYearConfig,
) -> EngineResult<ProRataResult> {
    input.validate()?;

    let mut trace = AuditTrace::default();

    let ratio = match input.basis {
        ProRataBasis::Hours { actual_hours } => {
            ProRataRatio::new(actual_hours, input.full_time_hours)
        }
        ProRataBasis::Percentage { percentage } => {
            ProRataRatio::from_percentage(percentage, input.full_time_hours)
        }
    };
    trace.record(
        "pro_rata_ratio",
        "Pro-Rata Ratio",
        "Part-time Workers (Prevention of Less Favourable Treatment) Regulations 2000 reg.5",
        serde_json::json!({
            "actual_hours": ratio.actual_hours.normalize().to_string(),
            "full_time_hours": ratio.full_time_hours.normalize().to_string()
        }),
        serde_json::json!({
            "ratio": round_factor(ratio.ratio()).to_string(),
            "percentage": round_pence(ratio.percentage()).to_string()
        }),
        format!(
            "{} ÷ {} hours = {} ({}%)",
            ratio.actual_hours.normalize(),
            ratio.full_time_hours.normalize(),
            round_factor(ratio.ratio()),
            round_pence(ratio.percentage()).normalize()
        ),
    );

    let annual = input.full_time_salary * input.frequency.periods_per_year();
    trace.record(
        "annualise_salary",
        "Annualise Full-Time Salary",
        "Calendar constants: 12 months, 52 weeks, 260 working days",
        serde_json::json!({
            "salary": input.full_time_salary.to_string(),
            "frequency": input.frequency
        }),
        serde_json::json!({ "annual_salary": annual.to_string() }),
        format!(
            "£{:.2} {} × {} = £{:.2} per year",
            input.full_time_salary,
            input.frequency,
            input.frequency.periods_per_year(),
            annual
        ),
    );

    let full_time_exact = SalaryAmounts::from_annual(annual, input.full_time_hours);
    let pro_rata_exact = full_time_exact.scaled(&ratio);
    let full_time = full_time_exact.rounded();
    let pro_rata = pro_rata_exact.rounded();
    let hourly_rate = full_time.hourly;

    let take_home = take_home_for(pro_rata.yearly, input.tax_region, tax_year);

    let breakdown = vec![
        BreakdownLine::new(
            "Pro-rata yearly",
            pro_rata.yearly,
            format!("£{} × {}", full_time.yearly, round_factor(ratio.ratio())),
        ),
        BreakdownLine::new("Pro-rata monthly", pro_rata.monthly, "Yearly ÷ 12"),
        BreakdownLine::new("Pro-rata weekly", pro_rata.weekly, "Yearly ÷ 52"),
        BreakdownLine::new("Pro-rata daily", pro_rata.daily, "Yearly ÷ 260 working days"),
        BreakdownLine::new(
            "Hourly rate",
            hourly_rate,
            format!("Full-time weekly ÷ {} hours", input.full_time_hours.normalize()),
        ),
        BreakdownLine::new(
            "Estimated take-home",
            take_home.take_home_pay,
            format!("After income tax and National Insurance ({})", tax_year.tax_year),
        ),
    ];

    let explanation = format!(
        "Working {} of {} full-time hours ({}%), the full-time salary of £{} a year becomes £{} a year pro-rata (£{} a month).",
        ratio.actual_hours.normalize(),
        input.full_time_hours.normalize(),
        round_pence(ratio.percentage()).normalize(),
        full_time.yearly,
        pro_rata.yearly,
        pro_rata.monthly
    );

    debug!(
        ratio = %round_factor(ratio.ratio()),
        full_time_yearly = %full_time.yearly,
        pro_rata_yearly = %pro_rata.yearly,
        "Pro-rata salary calculated"
    );

    Ok(ProRataResult {
        tax_year: tax_year.tax_year.clone(),
        ratio: round_factor(ratio.ratio()),
        percentage: round_pence(ratio.percentage()),
        actual_hours: ratio.actual_hours,
        full_time_hours: ratio.full_time_hours,
        full_time,
        pro_rata,
        hourly_rate,
        total: pro_rata.yearly,
        take_home,
        breakdown,
        explanation,
        audit_trace: trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::fixtures::tax_year_2025_26;
    use crate::error::EngineError;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn hours_input(salary: &str, frequency: SalaryFrequency, actual: &str, full: &str) -> ProRataInput {
        ProRataInput {
            full_time_salary: dec(salary),
            frequency,
            full_time_hours: dec(full),
            basis: ProRataBasis::Hours {
                actual_hours: dec(actual),
            },
            tax_region: TaxRegion::RestOfUk,
        }
    }

    fn validation_errors(input: &ProRataInput) -> crate::validation::ValidationErrors {
        match calculate_pro_rata(input, &tax_year_2025_26()) {
            Err(EngineError::Validation { errors }) => errors,
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_half_time_yearly_salary() {
        let input = hours_input("30000", SalaryFrequency::Yearly, "20", "40");
        let result = calculate_pro_rata(&input, &tax_year_2025_26()).unwrap();

        assert_eq!(result.ratio, dec("0.5"));
        assert_eq!(result.percentage, dec("50"));
        assert_eq!(result.full_time.yearly, dec("30000"));
        assert_eq!(result.pro_rata.yearly, dec("15000"));
        assert_eq!(result.pro_rata.monthly, dec("1250"));
        assert_eq!(result.pro_rata.weekly, dec("288.46"));
        assert_eq!(result.pro_rata.daily, dec("57.69"));
        assert_eq!(result.hourly_rate, dec("14.42"));
        assert_eq!(result.total, dec("15000"));
    }

    #[test]
    fn test_monthly_frequency_annualises_by_12() {
        let input = hours_input("2500", SalaryFrequency::Monthly, "30", "37.5");
        let result = calculate_pro_rata(&input, &tax_year_2025_26()).unwrap();

        assert_eq!(result.full_time.yearly, dec("30000"));
        assert_eq!(result.pro_rata.yearly, dec("24000"));
        assert_eq!(result.pro_rata.monthly, dec("2000"));
    }

    #[test]
    fn test_weekly_frequency_annualises_by_52() {
        let input = hours_input("500", SalaryFrequency::Weekly, "20", "40");
        let result = calculate_pro_rata(&input, &tax_year_2025_26()).unwrap();

        assert_eq!(result.full_time.yearly, dec("26000"));
        assert_eq!(result.pro_rata.weekly, dec("250"));
    }

    #[test]
    fn test_daily_frequency_annualises_by_260() {
        let input = hours_input("100", SalaryFrequency::Daily, "15", "37.5");
        let result = calculate_pro_rata(&input, &tax_year_2025_26()).unwrap();

        assert_eq!(result.full_time.yearly, dec("26000"));
        assert_eq!(result.full_time.daily, dec("100"));
        assert_eq!(result.pro_rata.daily, dec("40"));
        assert_eq!(result.pro_rata.yearly, dec("10400"));
    }

    #[test]
    fn test_percentage_basis() {
        let input = ProRataInput {
            full_time_salary: dec("40000"),
            frequency: SalaryFrequency::Yearly,
            full_time_hours: dec("37.5"),
            basis: ProRataBasis::Percentage {
                percentage: dec("60"),
            },
            tax_region: TaxRegion::RestOfUk,
        };
        let result = calculate_pro_rata(&input, &tax_year_2025_26()).unwrap();

        assert_eq!(result.ratio, dec("0.6"));
        assert_eq!(result.actual_hours, dec("22.5"));
        assert_eq!(result.pro_rata.yearly, dec("24000"));
    }

    #[test]
    fn test_full_time_hours_give_identical_amounts() {
        let input = hours_input("35000", SalaryFrequency::Yearly, "37.5", "37.5");
        let result = calculate_pro_rata(&input, &tax_year_2025_26()).unwrap();
        assert_eq!(result.full_time, result.pro_rata);
        assert_eq!(result.percentage, dec("100"));
    }

    #[test]
    fn test_take_home_uses_pro_rata_salary() {
        let input = hours_input("60000", SalaryFrequency::Yearly, "20", "40");
        let result = calculate_pro_rata(&input, &tax_year_2025_26()).unwrap();

        assert_eq!(result.take_home.gross_income, dec("30000"));
        assert_eq!(result.take_home.income_tax, dec("3486"));
        assert_eq!(result.tax_year, "2025-26");
    }

    #[test]
    fn test_actual_hours_above_full_time_rejected() {
        let errors = validation_errors(&hours_input("30000", SalaryFrequency::Yearly, "41", "40"));
        assert_eq!(errors.get("actual_hours"), Some("cannot exceed full-time hours"));
    }

    #[test]
    fn test_full_time_hours_above_168_rejected() {
        let errors = validation_errors(&hours_input("30000", SalaryFrequency::Yearly, "20", "169"));
        assert_eq!(
            errors.get("full_time_hours"),
            Some("cannot exceed 168 hours per week")
        );
        // Comparison against an invalid full-time figure is skipped.
        assert!(!errors.contains("actual_hours"));
    }

    #[test]
    fn test_all_errors_reported_together() {
        let errors = validation_errors(&hours_input("0", SalaryFrequency::Yearly, "0", "0"));
        assert_eq!(errors.len(), 3);
        assert!(errors.contains("full_time_salary"));
        assert!(errors.contains("full_time_hours"));
        assert!(errors.contains("actual_hours"));
    }

    #[test]
    fn test_percentage_out_of_range_rejected() {
        let mut input = hours_input("30000", SalaryFrequency::Yearly, "20", "40");
        input.basis = ProRataBasis::Percentage {
            percentage: dec("101"),
        };
        let errors = validation_errors(&input);
        assert!(errors.contains("percentage"));
    }

    #[test]
    fn test_input_deserializes_tagged_basis() {
        let input: ProRataInput = serde_json::from_str(
            r#"{
                "full_time_salary": "30000",
                "frequency": "yearly",
                "full_time_hours": "37.5",
                "basis": {"type": "percentage", "percentage": "80"}
            }"#,
        )
        .unwrap();
        assert_eq!(
            input.basis,
            ProRataBasis::Percentage {
                percentage: dec("80")
            }
        );
        assert_eq!(input.tax_region, TaxRegion::RestOfUk);
    }

    #[test]
    fn test_audit_trace_records_ratio_and_annualisation() {
        let input = hours_input("2500", SalaryFrequency::Monthly, "20", "40");
        let result = calculate_pro_rata(&input, &tax_year_2025_26()).unwrap();

        let ids: Vec<&str> = result
            .audit_trace
            .steps
            .iter()
            .map(|s| s.rule_id.as_str())
            .collect();
        assert_eq!(ids, vec!["pro_rata_ratio", "annualise_salary"]);
        assert!(result.explanation.contains("£15000.00 a year pro-rata"));
    }

    #[test]
    fn test_oversized_daily_salary_rejected() {
        let mut input = hours_input("100", SalaryFrequency::Daily, "20", "40");
        input.full_time_salary = Decimal::MAX;
        assert_eq!(
            validation_errors(&input).get("full_time_salary"),
            Some("cannot exceed 1000000000")
        );
    }

    proptest! {
        #[test]
        fn prop_pro_rata_is_linear(
            salary_pence in 100_000i64..20_000_000i64,
            actual_tenths in 1i64..=400i64,
        ) {
            let salary = Decimal::new(salary_pence, 2);
            let actual = Decimal::new(actual_tenths, 1);
            let full = dec("40");
            let input = ProRataInput {
                full_time_salary: salary,
                frequency: SalaryFrequency::Yearly,
                full_time_hours: full,
                basis: ProRataBasis::Hours { actual_hours: actual },
                tax_region: TaxRegion::RestOfUk,
            };
            let result = calculate_pro_rata(&input, &tax_year_2025_26()).unwrap();
            let expected = round_pence(salary * actual / full);
            prop_assert_eq!(result.pro_rata.yearly, expected);
            prop_assert!(result.pro_rata.yearly <= result.full_time.yearly);
        }

        #[test]
        fn prop_calculation_is_idempotent(
            salary in 1_000u32..200_000u32,
            actual in 1u32..=40u32,
        ) {
            let input = hours_input(&salary.to_string(), SalaryFrequency::Yearly, &actual.to_string(), "40");
            let year = tax_year_2025_26();
            let first = calculate_pro_rata(&input, &year).unwrap();
            let second = calculate_pro_rata(&input, &year).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
