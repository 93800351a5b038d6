//! Statutory Maternity Pay and Statutory Paternity Pay.
//!
//! Eligibility is tested at the qualifying week, 15 weeks before the expected
//! week of childbirth: 26 weeks of continuous employment and average weekly
//! earnings at or above the Lower Earnings Limit.
//!
//! ## Maternity tiers
//!
//! 1. First 6 weeks: 90% of average weekly earnings, uncapped.
//! 2. Next 33 weeks: the lower of the weekly cap and 90% of earnings.
//!
//! ## Paternity
//!
//! 1 or 2 weeks at the lower of the weekly cap and 90% of earnings.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{StatutoryPayConfig, TaxYearConfig};
use crate::error::EngineResult;
use crate::models::{AuditTrace, BreakdownLine, PeriodSpan, apply_percentage, round_pence};
use crate::validation::{AMOUNT_LIMIT, FieldValidator};

const MATERNITY_REFERENCE: &str =
    "Social Security Contributions and Benefits Act 1992 ss.164-166; Statutory Maternity Pay (General) Regulations 1986";
const PATERNITY_REFERENCE: &str =
    "Social Security Contributions and Benefits Act 1992 ss.171ZA-171ZE; Statutory Paternity Pay (Weekly Rates) Regulations 2002";

/// The kind of statutory leave pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    /// Statutory Maternity Pay.
    Maternity,
    /// Statutory Paternity Pay.
    Paternity,
}

impl std::fmt::Display for LeaveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeaveType::Maternity => write!(f, "Statutory Maternity Pay"),
            LeaveType::Paternity => write!(f, "Statutory Paternity Pay"),
        }
    }
}

/// How average weekly earnings are supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WeeklyEarnings {
    /// A fixed weekly figure.
    Fixed {
        /// Gross weekly earnings.
        weekly_amount: Decimal,
    },
    /// Variable pay, oldest week first. The trailing weeks are averaged.
    Variable {
        /// Gross earnings for each week.
        weekly_amounts: Vec<Decimal>,
    },
}

/// Input to [`calculate_statutory_pay`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryPayInput {
    /// Maternity or paternity.
    pub leave_type: LeaveType,
    /// Expected date of childbirth.
    pub childbirth_date: NaiveDate,
    /// First day of employment with this employer.
    pub employment_start_date: NaiveDate,
    /// Earnings before the qualifying week.
    pub earnings: WeeklyEarnings,
    /// Weeks of paternity pay claimed (paternity only).
    #[serde(default)]
    pub paternity_weeks: Option<u32>,
}

impl StatutoryPayInput {
    /// Validates the input against the year's rules, returning the qualifying
    /// week date and average weekly earnings.
    fn checked(&self, config: &StatutoryPayConfig) -> EngineResult<(NaiveDate, Decimal)> {
        let mut v = FieldValidator::new();

        let qualifying =
            qualifying_week_date(self.childbirth_date, config.qualifying_weeks_before_birth);
        if qualifying.is_none() {
            v.check("childbirth_date", false, "is out of range");
        }

        let average = match &self.earnings {
            WeeklyEarnings::Fixed { weekly_amount } => v
                .amount("earnings.weekly_amount", *weekly_amount)
                .then_some(*weekly_amount),
            WeeklyEarnings::Variable { weekly_amounts } => {
                let enough = v.check(
                    "earnings.weekly_amounts",
                    weekly_amounts.len() >= config.variable_pay_weeks,
                    format!("must contain at least {} weeks", config.variable_pay_weeks),
                );
                let in_bounds = v.check(
                    "earnings.weekly_amounts",
                    weekly_amounts.iter().all(|a| !a.is_sign_negative()),
                    "cannot contain negative amounts",
                ) && v.check(
                    "earnings.weekly_amounts",
                    weekly_amounts.iter().all(|a| *a <= AMOUNT_LIMIT),
                    format!("cannot contain amounts above {}", AMOUNT_LIMIT),
                );
                if enough && in_bounds {
                    let average = trailing_average(weekly_amounts, config.variable_pay_weeks);
                    v.positive("earnings.weekly_amounts", average)
                        .then_some(average)
                } else {
                    None
                }
            }
        };

        if self.leave_type == LeaveType::Paternity {
            if let Some(weeks) = v.required("paternity_weeks", self.paternity_weeks) {
                v.check(
                    "paternity_weeks",
                    (1..=config.paternity.max_weeks).contains(&weeks),
                    format!("must be between 1 and {}", config.paternity.max_weeks),
                );
            }
        }

        v.finish_with(qualifying.zip(average))
    }
}

/// Which eligibility condition failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityCondition {
    /// Too few weeks of continuous employment by the qualifying week.
    ContinuousEmployment,
    /// Average weekly earnings below the Lower Earnings Limit.
    LowerEarningsLimit,
}

/// A failed eligibility condition and how far short it fell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityFailure {
    /// The condition.
    pub condition: EligibilityCondition,
    /// The value needed.
    pub required: Decimal,
    /// The value the employee has.
    pub actual: Decimal,
    /// `required - actual`.
    pub shortfall: Decimal,
    /// Plain-language description.
    pub message: String,
}

/// One tier of the weekly payment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayTier {
    /// Period label, e.g. "Weeks 1-6".
    pub label: String,
    /// Weeks in the tier.
    pub weeks: u32,
    /// Percentage of average weekly earnings.
    pub rate_percent: Decimal,
    /// Amount paid each week.
    pub weekly_amount: Decimal,
    /// `weekly_amount × weeks`.
    pub total_amount: Decimal,
    /// How the weekly amount was chosen.
    pub description: String,
}

/// The result of a statutory pay calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryPayResult {
    /// Maternity or paternity.
    pub leave_type: LeaveType,
    /// The tax year whose rates were used.
    pub tax_year: String,
    /// The qualifying week date.
    pub qualifying_week_date: NaiveDate,
    /// Whole weeks from employment start to the qualifying week.
    pub weeks_employed: i64,
    /// Average weekly earnings.
    pub average_weekly_earnings: Decimal,
    /// Whether every eligibility condition was met.
    pub eligible: bool,
    /// Every condition that was not met.
    pub eligibility_failures: Vec<EligibilityFailure>,
    /// The payment schedule, empty when ineligible.
    pub tiers: Vec<PayTier>,
    /// Total weeks paid.
    pub total_weeks: u32,
    /// Total statutory pay.
    pub total_pay: Decimal,
    /// Line items.
    pub breakdown: Vec<BreakdownLine>,
    /// Plain-language summary.
    pub explanation: String,
    /// Rules applied.
    pub audit_trace: AuditTrace,
}

impl StatutoryPayResult {
    /// Returns the amount paid in a given week of leave (1-based).
    ///
    /// Returns `None` for week 0 or weeks beyond the schedule.
    pub fn weekly_amount_for(&self, week: u32) -> Option<Decimal> {
        if week == 0 {
            return None;
        }
        let mut last_week = 0;
        for tier in &self.tiers {
            last_week += tier.weeks;
            if week <= last_week {
                return Some(tier.weekly_amount);
            }
        }
        None
    }
}

/// Returns the qualifying week date for an expected childbirth date.
///
/// # Example
///
/// ```
/// use statutory_engine::calculation::qualifying_week_date;
/// use chrono::NaiveDate;
///
/// let birth = NaiveDate::from_ymd_opt(2025, 10, 19).unwrap();
/// assert_eq!(qualifying_week_date(birth, 15), NaiveDate::from_ymd_opt(2025, 7, 6));
/// ```
pub fn qualifying_week_date(childbirth_date: NaiveDate, weeks_before: u32) -> Option<NaiveDate> {
    childbirth_date.checked_sub_days(Days::new(u64::from(weeks_before) * 7))
}

/// Averages the last `weeks` entries.
fn trailing_average(amounts: &[Decimal], weeks: usize) -> Decimal {
    let trailing = &amounts[amounts.len().saturating_sub(weeks)..];
    if trailing.is_empty() {
        return Decimal::ZERO;
    }
    trailing.iter().copied().sum::<Decimal>() / Decimal::from(trailing.len())
}

fn eligibility_failures(
    weeks_employed: i64,
    average: Decimal,
    config: &StatutoryPayConfig,
) -> Vec<EligibilityFailure> {
    let mut failures = Vec::new();

    let required_weeks = i64::from(config.minimum_weeks_employed);
    if weeks_employed < required_weeks {
        failures.push(EligibilityFailure {
            condition: EligibilityCondition::ContinuousEmployment,
            required: Decimal::from(required_weeks),
            actual: Decimal::from(weeks_employed),
            shortfall: Decimal::from(required_weeks - weeks_employed),
            message: format!(
                "{} weeks of continuous employment by the qualifying week; {} needed ({} short)",
                weeks_employed,
                required_weeks,
                required_weeks - weeks_employed
            ),
        });
    }

    if average < config.lower_earnings_limit {
        let shortfall = round_pence(config.lower_earnings_limit - average);
        failures.push(EligibilityFailure {
            condition: EligibilityCondition::LowerEarningsLimit,
            required: config.lower_earnings_limit,
            actual: round_pence(average),
            shortfall,
            message: format!(
                "Average weekly earnings of £{} are below the Lower Earnings Limit of £{} (£{} short)",
                round_pence(average),
                round_pence(config.lower_earnings_limit),
                shortfall
            ),
        });
    }

    failures
}

fn capped_tier(label: String, weeks: u32, earnings_rate: Decimal, config: &StatutoryPayConfig) -> PayTier {
    let earnings_related = round_pence(earnings_rate);
    let weekly = earnings_related.min(config.weekly_cap);
    PayTier {
        label,
        weeks,
        rate_percent: config.earnings_rate,
        weekly_amount: round_pence(weekly),
        total_amount: round_pence(weekly * Decimal::from(weeks)),
        description: if weekly < earnings_related {
            format!("Capped at the statutory rate of £{}", round_pence(config.weekly_cap))
        } else {
            format!("{}% of average weekly earnings", config.earnings_rate.normalize())
        },
    }
}

fn payment_tiers(
    input: &StatutoryPayInput,
    average: Decimal,
    config: &StatutoryPayConfig,
) -> Vec<PayTier> {
    let earnings_rate = apply_percentage(average, config.earnings_rate);
    match input.leave_type {
        LeaveType::Maternity => {
            let higher_weeks = config.maternity.higher_rate_weeks;
            let standard_weeks = config.maternity.standard_rate_weeks;
            let higher = round_pence(earnings_rate);
            vec![
                PayTier {
                    label: format!("Weeks 1-{}", higher_weeks),
                    weeks: higher_weeks,
                    rate_percent: config.earnings_rate,
                    weekly_amount: higher,
                    total_amount: round_pence(higher * Decimal::from(higher_weeks)),
                    description: format!(
                        "{}% of average weekly earnings, uncapped",
                        config.earnings_rate.normalize()
                    ),
                },
                capped_tier(
                    format!("Weeks {}-{}", higher_weeks + 1, higher_weeks + standard_weeks),
                    standard_weeks,
                    earnings_rate,
                    config,
                ),
            ]
        }
        LeaveType::Paternity => {
            let weeks = input.paternity_weeks.unwrap_or(1);
            let label = if weeks == 1 {
                "Week 1".to_string()
            } else {
                format!("Weeks 1-{}", weeks)
            };
            vec![capped_tier(label, weeks, earnings_rate, config)]
        }
    }
}

/// Calculates Statutory Maternity Pay or Statutory Paternity Pay.
///
/// Ineligibility is not an error: the result lists every failed condition
/// with its shortfall and pays nothing.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Validation`] when earnings are
/// missing, not positive or above the amount limit, fewer weekly amounts
/// than the averaging period are supplied, or paternity weeks are outside
/// the permitted range.
///
/// # Example
///
/// ```
/// use statutory_engine::calculation::{calculate_statutory_pay, LeaveType, StatutoryPayInput, WeeklyEarnings};
/// use statutory_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let config = ConfigLoader::load("config/uk").unwrap();
/// let input = StatutoryPayInput {
///     leave_type: LeaveType::Maternity,
///     childbirth_date: NaiveDate::from_ymd_opt(2025, 10, 19).unwrap(),
///     employment_start_date: NaiveDate::from_ymd_opt(2020, 1, 6).unwrap(),
///     earnings: WeeklyEarnings::Fixed { weekly_amount: Decimal::from(200) },
///     paternity_weeks: None,
/// };
///
/// let result = calculate_statutory_pay(&input, config.get_tax_year("2025-26").unwrap()).unwrap();
/// assert!(result.eligible);
/// assert_eq!(result.total_pay, Decimal::from(7020));
/// ```
pub fn calculate_statutory_pay(
    input: &StatutoryPayInput,
    tax_year: &TaxYearConfig,
) -> EngineResult<StatutoryPayResult> {
    let config = &tax_year.statutory_pay;
    let (qualifying_date, average) = input.checked(config)?;
    let reference = match input.leave_type {
        LeaveType::Maternity => MATERNITY_REFERENCE,
        LeaveType::Paternity => PATERNITY_REFERENCE,
    };

    let mut trace = AuditTrace::default();

    // Employment starting on or after the qualifying week counts as none.
    let weeks_employed = PeriodSpan::new(input.employment_start_date, qualifying_date)
        .map(|span| span.whole_weeks())
        .unwrap_or(0);
    trace.record(
        "qualifying_week",
        "Qualifying Week",
        reference,
        serde_json::json!({
            "childbirth_date": input.childbirth_date.to_string(),
            "employment_start_date": input.employment_start_date.to_string(),
            "weeks_before_birth": config.qualifying_weeks_before_birth
        }),
        serde_json::json!({
            "qualifying_week_date": qualifying_date.to_string(),
            "weeks_employed": weeks_employed
        }),
        format!(
            "{} weeks before {} is {}; {} whole weeks employed by then",
            config.qualifying_weeks_before_birth,
            input.childbirth_date,
            qualifying_date,
            weeks_employed
        ),
    );

    trace.record(
        "average_weekly_earnings",
        "Average Weekly Earnings",
        "Statutory Maternity Pay (General) Regulations 1986 reg.21",
        match &input.earnings {
            WeeklyEarnings::Fixed { weekly_amount } => {
                serde_json::json!({ "fixed": weekly_amount.to_string() })
            }
            WeeklyEarnings::Variable { weekly_amounts } => serde_json::json!({
                "variable": weekly_amounts.iter().map(|a| a.to_string()).collect::<Vec<_>>(),
                "weeks_averaged": config.variable_pay_weeks
            }),
        },
        serde_json::json!({ "average_weekly_earnings": round_pence(average).to_string() }),
        match &input.earnings {
            WeeklyEarnings::Fixed { .. } => format!("Fixed weekly earnings of £{}", round_pence(average)),
            WeeklyEarnings::Variable { .. } => format!(
                "Mean of the last {} weeks is £{}",
                config.variable_pay_weeks,
                round_pence(average)
            ),
        },
    );

    let failures = eligibility_failures(weeks_employed, average, config);
    let eligible = failures.is_empty();
    trace.record(
        "eligibility",
        "Eligibility",
        reference,
        serde_json::json!({
            "weeks_employed": weeks_employed,
            "minimum_weeks_employed": config.minimum_weeks_employed,
            "average_weekly_earnings": round_pence(average).to_string(),
            "lower_earnings_limit": config.lower_earnings_limit.to_string()
        }),
        serde_json::json!({ "eligible": eligible, "failed_conditions": failures.len() }),
        if eligible {
            "Continuous employment and earnings conditions are both met".to_string()
        } else {
            failures
                .iter()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        },
    );

    for failure in &failures {
        warn!(
            leave_type = %input.leave_type,
            condition = ?failure.condition,
            shortfall = %failure.shortfall,
            "Not eligible for statutory pay"
        );
        trace.warn("not_eligible", failure.message.clone(), "high");
    }

    let tiers = if eligible {
        payment_tiers(input, average, config)
    } else {
        Vec::new()
    };

    for tier in &tiers {
        trace.record(
            "payment_tier",
            &format!("Payment Tier: {}", tier.label),
            reference,
            serde_json::json!({
                "weeks": tier.weeks,
                "average_weekly_earnings": round_pence(average).to_string(),
                "weekly_cap": config.weekly_cap.to_string()
            }),
            serde_json::json!({
                "weekly_amount": tier.weekly_amount.to_string(),
                "total_amount": tier.total_amount.to_string()
            }),
            format!(
                "{} × £{} = £{} ({})",
                tier.weeks, tier.weekly_amount, tier.total_amount, tier.description
            ),
        );
    }

    let total_weeks: u32 = tiers.iter().map(|t| t.weeks).sum();
    let total_pay = round_pence(tiers.iter().map(|t| t.total_amount).sum());

    let mut breakdown: Vec<BreakdownLine> = tiers
        .iter()
        .map(|t| {
            BreakdownLine::new(
                t.label.clone(),
                t.total_amount,
                format!("{} weeks at £{} ({})", t.weeks, t.weekly_amount, t.description),
            )
        })
        .collect();
    breakdown.push(BreakdownLine::new(
        format!("Total {}", input.leave_type),
        total_pay,
        format!("{} weeks", total_weeks),
    ));

    let explanation = if eligible {
        format!(
            "With average weekly earnings of £{} and {} weeks' service at the qualifying week ({}), {} totals £{} over {} weeks.",
            round_pence(average),
            weeks_employed,
            qualifying_date,
            input.leave_type,
            total_pay,
            total_weeks
        )
    } else {
        format!(
            "Not eligible for {}: {}.",
            input.leave_type,
            failures
                .iter()
                .map(|f| f.message.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        )
    };

    debug!(
        leave_type = %input.leave_type,
        tax_year = %tax_year.tax_year,
        eligible,
        total_pay = %total_pay,
        "Statutory pay calculated"
    );

    Ok(StatutoryPayResult {
        leave_type: input.leave_type,
        tax_year: tax_year.tax_year.clone(),
        qualifying_week_date: qualifying_date,
        weeks_employed,
        average_weekly_earnings: round_pence(average),
        eligible,
        eligibility_failures: failures,
        tiers,
        total_weeks,
        total_pay,
        breakdown,
        explanation,
        audit_trace: trace,
    })
}
