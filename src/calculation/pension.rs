//! Workplace pension contributions.
//!
//! Contributions are a percentage of either qualifying earnings (the band of
//! salary between the year's lower and upper limits) or the full salary.
//! Auto-enrolment eligibility is reported but never blocks the figures, so
//! the calculator can be used for what-if comparisons.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{PensionConfig, TaxYearConfig};
use crate::error::EngineResult;
use crate::models::{
    AuditTrace, BreakdownLine, MONTHS_PER_YEAR, WEEKS_PER_YEAR, apply_percentage, round_pence,
};
use crate::validation::{FieldValidator, Validate};

const MAXIMUM_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
const MINIMUM_INPUT_AGE: Decimal = Decimal::from_parts(16, 0, 0, false, 0);
const MAXIMUM_INPUT_AGE: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Which earnings contributions are calculated on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PensionBasis {
    /// Earnings between the lower and upper qualifying earnings limits.
    #[default]
    Qualifying,
    /// The whole salary.
    Full,
}

/// Input to [`calculate_pension`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionInput {
    /// Gross annual salary.
    pub annual_salary: Decimal,
    /// Contracted weekly hours.
    pub weekly_hours: Decimal,
    /// Age in whole years.
    pub age: u32,
    /// Employee contribution percentage.
    pub employee_rate: Decimal,
    /// Employer contribution percentage.
    pub employer_rate: Decimal,
    /// Earnings basis.
    #[serde(default)]
    pub basis: PensionBasis,
}

impl Validate for PensionInput {
    fn validate(&self) -> EngineResult<()> {
        let mut v = FieldValidator::new();
        v.amount("annual_salary", self.annual_salary);
        v.weekly_hours("weekly_hours", self.weekly_hours);
        v.in_range("employee_rate", self.employee_rate, Decimal::ZERO, MAXIMUM_RATE);
        v.in_range("employer_rate", self.employer_rate, Decimal::ZERO, MAXIMUM_RATE);
        v.in_range(
            "age",
            Decimal::from(self.age),
            MINIMUM_INPUT_AGE,
            MAXIMUM_INPUT_AGE,
        );
        v.finish()
    }
}

/// The result of a pension contribution calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionResult {
    /// The tax year whose limits were used.
    pub tax_year: String,
    /// Earnings basis used.
    pub basis: PensionBasis,
    /// Whether the employee must be auto-enrolled.
    pub eligible: bool,
    /// Every reason the employee is not eligible.
    pub eligibility_reasons: Vec<String>,
    /// Earnings contributions are calculated on.
    pub pensionable_earnings: Decimal,
    /// Annual employee contribution.
    pub employee_contribution: Decimal,
    /// Annual employer contribution.
    pub employer_contribution: Decimal,
    /// Annual total contribution.
    pub total_contribution: Decimal,
    /// Monthly employee contribution.
    pub monthly_employee_contribution: Decimal,
    /// Monthly employer contribution.
    pub monthly_employer_contribution: Decimal,
    /// Monthly total contribution.
    pub monthly_total_contribution: Decimal,
    /// Weekly total contribution.
    pub weekly_total_contribution: Decimal,
    /// Line items.
    pub breakdown: Vec<BreakdownLine>,
    /// Plain-language summary.
    pub explanation: String,
    /// Rules applied.
    pub audit_trace: AuditTrace,
}

/// Returns the earnings contributions are calculated on.
///
/// # Example
///
/// ```
/// use statutory_engine::calculation::{pensionable_earnings, PensionBasis};
/// use statutory_engine::config::ConfigLoader;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("config/uk").unwrap();
/// let limits = &config.default_tax_year().unwrap().pension;
///
/// let earnings = pensionable_earnings(Decimal::from(30000), PensionBasis::Qualifying, limits);
/// assert_eq!(earnings, Decimal::from(23760));
/// ```
pub fn pensionable_earnings(salary: Decimal, basis: PensionBasis, config: &PensionConfig) -> Decimal {
    match basis {
        PensionBasis::Qualifying => {
            salary.clamp(
                config.qualifying_earnings_lower,
                config.qualifying_earnings_upper,
            ) - config.qualifying_earnings_lower
        }
        PensionBasis::Full => salary,
    }
}

fn eligibility_reasons(input: &PensionInput, config: &PensionConfig) -> Vec<String> {
    let mut reasons = Vec::new();
    if input.age < config.minimum_age {
        reasons.push(format!(
            "Age {} is below the auto-enrolment minimum of {}",
            input.age, config.minimum_age
        ));
    }
    if input.age > config.maximum_age {
        reasons.push(format!(
            "Age {} is above the auto-enrolment maximum of {}",
            input.age, config.maximum_age
        ));
    }
    if input.annual_salary < config.earnings_trigger {
        reasons.push(format!(
            "Salary of £{} is below the earnings trigger of £{}",
            round_pence(input.annual_salary),
            round_pence(config.earnings_trigger)
        ));
    }
    reasons
}

/// Calculates employee and employer pension contributions.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Validation`] for a non-positive
/// salary, weekly hours outside (0, 168], rates outside 0-20% or an age
/// outside 16-100.
pub fn calculate_pension(
    input: &PensionInput,
    tax_year: &TaxYearConfig,
) -> EngineResult<PensionResult> {
    input.validate()?;

    let config = &tax_year.pension;
    let mut trace = AuditTrace::default();

    let reasons = eligibility_reasons(input, config);
    let eligible = reasons.is_empty();
    trace.record(
        "auto_enrolment_eligibility",
        "Auto-Enrolment Eligibility",
        "Pensions Act 2008 s.3",
        serde_json::json!({
            "age": input.age,
            "annual_salary": input.annual_salary.to_string(),
            "minimum_age": config.minimum_age,
            "maximum_age": config.maximum_age,
            "earnings_trigger": config.earnings_trigger.to_string()
        }),
        serde_json::json!({ "eligible": eligible, "reasons": reasons }),
        if eligible {
            format!(
                "Aged {}-{} and earning at least £{}: must be auto-enrolled",
                config.minimum_age,
                config.maximum_age,
                round_pence(config.earnings_trigger)
            )
        } else {
            reasons.join("; ")
        },
    );

    if !eligible {
        warn!(
            age = input.age,
            annual_salary = %input.annual_salary,
            reasons = reasons.len(),
            "Not eligible for pension auto-enrolment"
        );
        for reason in &reasons {
            trace.warn("not_auto_enrolment_eligible", reason.clone(), "medium");
        }
    }

    let pensionable = pensionable_earnings(input.annual_salary, input.basis, config);
    trace.record(
        "pensionable_earnings",
        "Pensionable Earnings",
        match input.basis {
            PensionBasis::Qualifying => "Pensions Act 2008 s.13",
            PensionBasis::Full => "Scheme rules",
        },
        serde_json::json!({
            "annual_salary": input.annual_salary.to_string(),
            "basis": input.basis,
            "lower_limit": config.qualifying_earnings_lower.to_string(),
            "upper_limit": config.qualifying_earnings_upper.to_string()
        }),
        serde_json::json!({ "pensionable_earnings": round_pence(pensionable).to_string() }),
        match input.basis {
            PensionBasis::Qualifying => format!(
                "Salary of £{} clamped to £{}-£{}, less £{} = £{}",
                round_pence(input.annual_salary),
                round_pence(config.qualifying_earnings_lower),
                round_pence(config.qualifying_earnings_upper),
                round_pence(config.qualifying_earnings_lower),
                round_pence(pensionable)
            ),
            PensionBasis::Full => format!("Full salary of £{}", round_pence(pensionable)),
        },
    );

    let employee = round_pence(apply_percentage(pensionable, input.employee_rate));
    let employer = round_pence(apply_percentage(pensionable, input.employer_rate));
    let total = employee + employer;
    trace.record(
        "contributions",
        "Contributions",
        "Occupational and Personal Pension Schemes (Automatic Enrolment) Regulations 2010",
        serde_json::json!({
            "pensionable_earnings": round_pence(pensionable).to_string(),
            "employee_rate": input.employee_rate.to_string(),
            "employer_rate": input.employer_rate.to_string()
        }),
        serde_json::json!({
            "employee": employee.to_string(),
            "employer": employer.to_string(),
            "total": total.to_string()
        }),
        format!(
            "Employee {}% = £{}, employer {}% = £{}",
            input.employee_rate.normalize(),
            employee,
            input.employer_rate.normalize(),
            employer
        ),
    );

    if eligible {
        let total_rate = input.employee_rate + input.employer_rate;
        if input.employee_rate < config.minimum_employee_rate {
            trace.warn(
                "employee_rate_below_minimum",
                format!(
                    "Employee rate of {}% is below the statutory minimum of {}%",
                    input.employee_rate.normalize(),
                    config.minimum_employee_rate.normalize()
                ),
                "medium",
            );
        }
        if input.employer_rate < config.minimum_employer_rate {
            trace.warn(
                "employer_rate_below_minimum",
                format!(
                    "Employer rate of {}% is below the statutory minimum of {}%",
                    input.employer_rate.normalize(),
                    config.minimum_employer_rate.normalize()
                ),
                "high",
            );
        }
        if total_rate < config.minimum_total_rate {
            trace.warn(
                "total_rate_below_minimum",
                format!(
                    "Total rate of {}% is below the statutory minimum of {}%",
                    total_rate.normalize(),
                    config.minimum_total_rate.normalize()
                ),
                "high",
            );
        }
    }

    let monthly_employee = round_pence(employee / MONTHS_PER_YEAR);
    let monthly_employer = round_pence(employer / MONTHS_PER_YEAR);
    let monthly_total = round_pence(total / MONTHS_PER_YEAR);
    let weekly_total = round_pence(total / WEEKS_PER_YEAR);

    let breakdown = vec![
        BreakdownLine::new(
            "Pensionable earnings",
            round_pence(pensionable),
            match input.basis {
                PensionBasis::Qualifying => "Qualifying earnings",
                PensionBasis::Full => "Full salary",
            },
        ),
        BreakdownLine::new(
            "Employee contribution",
            employee,
            format!("{}% of pensionable earnings", input.employee_rate.normalize()),
        ),
        BreakdownLine::new(
            "Employer contribution",
            employer,
            format!("{}% of pensionable earnings", input.employer_rate.normalize()),
        ),
        BreakdownLine::new("Total contribution", total, "Per year"),
        BreakdownLine::new("Monthly contribution", monthly_total, "Total ÷ 12"),
        BreakdownLine::new("Weekly contribution", weekly_total, "Total ÷ 52"),
    ];

    let explanation = format!(
        "On pensionable earnings of £{}, contributions total £{} a year (£{} a month): £{} from the employee and £{} from the employer.{}",
        round_pence(pensionable),
        total,
        monthly_total,
        employee,
        employer,
        if eligible {
            ""
        } else {
            " The employee is not eligible for auto-enrolment."
        }
    );

    debug!(
        tax_year = %tax_year.tax_year,
        eligible,
        pensionable = %pensionable,
        total = %total,
        "Pension contributions calculated"
    );

    Ok(PensionResult {
        tax_year: tax_year.tax_year.clone(),
        basis: input.basis,
        eligible,
        eligibility_reasons: reasons,
        pensionable_earnings: round_pence(pensionable),
        employee_contribution: employee,
        employer_contribution: employer,
        total_contribution: total,
        monthly_employee_contribution: monthly_employee,
        monthly_employer_contribution: monthly_employer,
        monthly_total_contribution: monthly_total,
        weekly_total_contribution: weekly_total,
        breakdown,
        explanation,
        audit_trace: trace,
    })
}
