//! Term-time-only salary.
//!
//! A term-time-only (TTO) employee is paid for the weeks they work plus their
//! holiday entitlement, scaled by their share of full-time hours:
//!
//! ```text
//! annual = FTE salary × (contracted hours ÷ full-time hours) × (paid weeks ÷ 52)
//! ```

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{
    AuditTrace, BreakdownLine, MONTHS_PER_YEAR, ProRataRatio, WEEKS_PER_YEAR, round_factor,
    round_pence,
};
use crate::validation::{FieldValidator, Validate};

/// Working days a weekly amount is divided by for a daily rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyDivisor {
    /// Five days.
    #[default]
    Five,
    /// Five and a half days.
    FiveAndHalf,
    /// Six days.
    Six,
}

impl DailyDivisor {
    /// The divisor as a number of days.
    pub fn days(self) -> Decimal {
        match self {
            DailyDivisor::Five => Decimal::from(5),
            DailyDivisor::FiveAndHalf => Decimal::new(55, 1),
            DailyDivisor::Six => Decimal::from(6),
        }
    }
}

/// How the annual salary is spread across the year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSchedule {
    /// Twelve equal monthly payments.
    #[default]
    SpreadOverYear,
    /// Payments only in the months covered by the paid weeks.
    PaidMonthsOnly,
}

/// Input to [`calculate_term_time`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermTimeInput {
    /// Full-time equivalent annual salary.
    pub fte_annual_salary: Decimal,
    /// Weekly hours in the contract.
    pub contracted_weekly_hours: Decimal,
    /// Full-time weekly hours for the post.
    pub full_time_weekly_hours: Decimal,
    /// Term weeks worked in the year.
    pub term_weeks_worked: Decimal,
    /// Paid holiday entitlement in weeks.
    pub paid_holiday_weeks: Decimal,
    /// Bank holidays falling outside term, in weeks.
    #[serde(default)]
    pub bank_holiday_weeks: Decimal,
    /// Monthly payment schedule.
    #[serde(default)]
    pub payment_schedule: PaymentSchedule,
    /// Divisor for the daily rate.
    #[serde(default)]
    pub daily_divisor: DailyDivisor,
}

impl TermTimeInput {
    /// Term weeks plus holiday weeks.
    pub fn paid_weeks(&self) -> Decimal {
        self.term_weeks_worked + self.paid_holiday_weeks + self.bank_holiday_weeks
    }
}

impl Validate for TermTimeInput {
    fn validate(&self) -> EngineResult<()> {
        let mut v = FieldValidator::new();
        v.amount("fte_annual_salary", self.fte_annual_salary);

        let full_time_ok = v.weekly_hours("full_time_weekly_hours", self.full_time_weekly_hours);
        if v.weekly_hours("contracted_weekly_hours", self.contracted_weekly_hours) && full_time_ok {
            v.check(
                "contracted_weekly_hours",
                self.contracted_weekly_hours <= self.full_time_weekly_hours,
                "cannot exceed full-time hours",
            );
        }

        let weeks_ok = [
            v.quantity("term_weeks_worked", self.term_weeks_worked)
                && v.weeks_in_year("term_weeks_worked", self.term_weeks_worked),
            v.non_negative("paid_holiday_weeks", self.paid_holiday_weeks)
                && v.weeks_in_year("paid_holiday_weeks", self.paid_holiday_weeks),
            v.non_negative("bank_holiday_weeks", self.bank_holiday_weeks)
                && v.weeks_in_year("bank_holiday_weeks", self.bank_holiday_weeks),
        ];
        if weeks_ok.iter().all(|ok| *ok) {
            v.check(
                "paid_weeks",
                self.paid_weeks() <= WEEKS_PER_YEAR,
                "term, holiday and bank holiday weeks cannot exceed 52 in total",
            );
        }

        v.finish()
    }
}

/// The result of a term-time-only salary calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermTimeResult {
    /// Contracted ÷ full-time hours, to 4 decimal places.
    pub hours_factor: Decimal,
    /// Term weeks plus holiday weeks.
    pub paid_weeks: Decimal,
    /// Paid weeks ÷ 52, to 4 decimal places.
    pub tto_pay_factor: Decimal,
    /// Months the salary is paid over.
    pub paid_months: u32,
    /// Annual term-time-only salary.
    pub annual_salary: Decimal,
    /// Each monthly payment.
    pub monthly_pay: Decimal,
    /// Pay per paid week.
    pub weekly_pay: Decimal,
    /// Weekly pay ÷ daily divisor.
    pub daily_pay: Decimal,
    /// Weekly pay ÷ contracted hours.
    pub hourly_rate: Decimal,
    /// Line items.
    pub breakdown: Vec<BreakdownLine>,
    /// Plain-language summary.
    pub explanation: String,
    /// Rules applied.
    pub audit_trace: AuditTrace,
}

/// Months covered by the paid weeks, between 1 and 12.
///
/// # Example
///
/// ```
/// use statutory_engine::calculation::paid_months_for;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(paid_months_for(Decimal::from_str("44.6").unwrap()), 11);
/// assert_eq!(paid_months_for(Decimal::from(52)), 12);
/// ```
pub fn paid_months_for(paid_weeks: Decimal) -> u32 {
    (paid_weeks * MONTHS_PER_YEAR / WEEKS_PER_YEAR)
        .ceil()
        .to_u32()
        .unwrap_or(12)
        .clamp(1, 12)
}

/// Calculates a term-time-only salary.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Validation`] for a non-positive
/// salary or term weeks, invalid hours, contracted hours above full-time,
/// negative holiday weeks, or more than 52 paid weeks.
pub fn calculate_term_time(input: &TermTimeInput) -> EngineResult<TermTimeResult> {
    input.validate()?;

    let mut trace = AuditTrace::default();

    let hours = ProRataRatio::new(input.contracted_weekly_hours, input.full_time_weekly_hours);
    let paid_weeks = input.paid_weeks();
    let weeks = ProRataRatio::new(paid_weeks, WEEKS_PER_YEAR);

    trace.record(
        "hours_factor",
        "Hours Factor",
        "Part-time Workers (Prevention of Less Favourable Treatment) Regulations 2000 reg.5",
        serde_json::json!({
            "contracted_weekly_hours": input.contracted_weekly_hours.to_string(),
            "full_time_weekly_hours": input.full_time_weekly_hours.to_string()
        }),
        serde_json::json!({ "hours_factor": round_factor(hours.ratio()).to_string() }),
        format!(
            "{} ÷ {} hours = {}",
            input.contracted_weekly_hours.normalize(),
            input.full_time_weekly_hours.normalize(),
            round_factor(hours.ratio())
        ),
    );

    trace.record(
        "tto_pay_factor",
        "Term-Time Pay Factor",
        "Working Time Regulations 1998 regs.13-13A",
        serde_json::json!({
            "term_weeks_worked": input.term_weeks_worked.to_string(),
            "paid_holiday_weeks": input.paid_holiday_weeks.to_string(),
            "bank_holiday_weeks": input.bank_holiday_weeks.to_string()
        }),
        serde_json::json!({
            "paid_weeks": paid_weeks.to_string(),
            "tto_pay_factor": round_factor(weeks.ratio()).to_string()
        }),
        format!(
            "{} + {} + {} = {} paid weeks; ÷ 52 = {}",
            input.term_weeks_worked.normalize(),
            input.paid_holiday_weeks.normalize(),
            input.bank_holiday_weeks.normalize(),
            paid_weeks.normalize(),
            round_factor(weeks.ratio())
        ),
    );

    let annual = weeks.apply(hours.apply(input.fte_annual_salary));
    let paid_months = match input.payment_schedule {
        PaymentSchedule::SpreadOverYear => 12,
        PaymentSchedule::PaidMonthsOnly => paid_months_for(paid_weeks),
    };
    let monthly = annual / Decimal::from(paid_months);
    let weekly = annual / paid_weeks;
    let daily = weekly / input.daily_divisor.days();
    let hourly = weekly / input.contracted_weekly_hours;

    trace.record(
        "annual_tto_salary",
        "Annual Term-Time Salary",
        "Part-time Workers (Prevention of Less Favourable Treatment) Regulations 2000 reg.5",
        serde_json::json!({
            "fte_annual_salary": input.fte_annual_salary.to_string(),
            "hours_factor": round_factor(hours.ratio()).to_string(),
            "tto_pay_factor": round_factor(weeks.ratio()).to_string()
        }),
        serde_json::json!({
            "annual_salary": round_pence(annual).to_string(),
            "paid_months": paid_months
        }),
        format!(
            "£{} × {} × {} = £{}, paid over {} months",
            round_pence(input.fte_annual_salary),
            round_factor(hours.ratio()),
            round_factor(weeks.ratio()),
            round_pence(annual),
            paid_months
        ),
    );

    let breakdown = vec![
        BreakdownLine::new(
            "Annual salary",
            round_pence(annual),
            format!(
                "FTE £{} × hours factor {} × pay factor {}",
                round_pence(input.fte_annual_salary),
                round_factor(hours.ratio()),
                round_factor(weeks.ratio())
            ),
        ),
        BreakdownLine::new(
            "Monthly pay",
            round_pence(monthly),
            format!("Annual ÷ {} months", paid_months),
        ),
        BreakdownLine::new(
            "Weekly pay",
            round_pence(weekly),
            format!("Annual ÷ {} paid weeks", paid_weeks.normalize()),
        ),
        BreakdownLine::new(
            "Daily pay",
            round_pence(daily),
            format!("Weekly ÷ {} days", input.daily_divisor.days().normalize()),
        ),
        BreakdownLine::new(
            "Hourly rate",
            round_pence(hourly),
            format!("Weekly ÷ {} hours", input.contracted_weekly_hours.normalize()),
        ),
    ];

    let explanation = format!(
        "Working {} of {} hours for {} paid weeks a year, the term-time-only salary is £{} (£{} a month over {} months).",
        input.contracted_weekly_hours.normalize(),
        input.full_time_weekly_hours.normalize(),
        paid_weeks.normalize(),
        round_pence(annual),
        round_pence(monthly),
        paid_months
    );

    debug!(
        paid_weeks = %paid_weeks,
        annual_salary = %round_pence(annual),
        paid_months,
        "Term-time salary calculated"
    );

    Ok(TermTimeResult {
        hours_factor: round_factor(hours.ratio()),
        paid_weeks,
        tto_pay_factor: round_factor(weeks.ratio()),
        paid_months,
        annual_salary: round_pence(annual),
        monthly_pay: round_pence(monthly),
        weekly_pay: round_pence(weekly),
        daily_pay: round_pence(daily),
        hourly_rate: round_pence(hourly),
        breakdown,
        explanation,
        audit_trace: trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn school_support() -> TermTimeInput {
        TermTimeInput {
            fte_annual_salary: dec("30000"),
            contracted_weekly_hours: dec("20"),
            full_time_weekly_hours: dec("37.5"),
            term_weeks_worked: dec("39"),
            paid_holiday_weeks: dec("5.6"),
            bank_holiday_weeks: Decimal::ZERO,
            payment_schedule: PaymentSchedule::SpreadOverYear,
            daily_divisor: DailyDivisor::Five,
        }
    }

    fn validation_errors(input: &TermTimeInput) -> crate::validation::ValidationErrors {
        match calculate_term_time(input) {
            Err(EngineError::Validation { errors }) => errors,
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_school_support_scenario() {
        let result = calculate_term_time(&school_support()).unwrap();

        assert_eq!(result.hours_factor, dec("0.5333"));
        assert_eq!(result.paid_weeks, dec("44.6"));
        assert_eq!(result.tto_pay_factor, dec("0.8577"));
        assert_eq!(result.annual_salary, dec("13723.08"));
        assert_eq!(result.paid_months, 12);
        assert_eq!(result.monthly_pay, dec("1143.59"));
        assert_eq!(result.weekly_pay, dec("307.69"));
        assert_eq!(result.daily_pay, dec("61.54"));
        assert_eq!(result.hourly_rate, dec("15.38"));
    }

    #[test]
    fn test_paid_months_only_schedule() {
        let input = TermTimeInput {
            payment_schedule: PaymentSchedule::PaidMonthsOnly,
            ..school_support()
        };
        let result = calculate_term_time(&input).unwrap();

        assert_eq!(result.paid_months, 11);
        assert_eq!(result.monthly_pay, dec("1247.55"));
        assert_eq!(result.annual_salary, dec("13723.08"));
    }

    #[test]
    fn test_daily_divisors() {
        let mut input = school_support();
        input.daily_divisor = DailyDivisor::FiveAndHalf;
        assert_eq!(calculate_term_time(&input).unwrap().daily_pay, dec("55.94"));

        input.daily_divisor = DailyDivisor::Six;
        assert_eq!(calculate_term_time(&input).unwrap().daily_pay, dec("51.28"));
    }

    #[test]
    fn test_bank_holiday_weeks_add_to_paid_weeks() {
        let input = TermTimeInput {
            bank_holiday_weeks: dec("1.6"),
            ..school_support()
        };
        let result = calculate_term_time(&input).unwrap();
        assert_eq!(result.paid_weeks, dec("46.2"));
    }

    #[test]
    fn test_full_year_full_time_equals_fte_salary() {
        let input = TermTimeInput {
            contracted_weekly_hours: dec("37.5"),
            term_weeks_worked: dec("46.4"),
            ..school_support()
        };
        let result = calculate_term_time(&input).unwrap();
        assert_eq!(result.paid_weeks, dec("52"));
        assert_eq!(result.annual_salary, dec("30000"));
        assert_eq!(result.monthly_pay, dec("2500"));
    }

    #[test]
    fn test_paid_months_clamped() {
        assert_eq!(paid_months_for(dec("1")), 1);
        assert_eq!(paid_months_for(dec("4.34")), 2);
        assert_eq!(paid_months_for(dec("52")), 12);
    }

    #[test]
    fn test_contracted_above_full_time_rejected() {
        let input = TermTimeInput {
            contracted_weekly_hours: dec("40"),
            ..school_support()
        };
        let errors = validation_errors(&input);
        assert_eq!(
            errors.get("contracted_weekly_hours"),
            Some("cannot exceed full-time hours")
        );
    }

    #[test]
    fn test_paid_weeks_above_52_rejected() {
        let input = TermTimeInput {
            term_weeks_worked: dec("48"),
            ..school_support()
        };
        let errors = validation_errors(&input);
        assert!(errors.contains("paid_weeks"));
    }

    #[test]
    fn test_week_fields_validated() {
        let input = TermTimeInput {
            term_weeks_worked: Decimal::ZERO,
            paid_holiday_weeks: dec("-1"),
            ..school_support()
        };
        let errors = validation_errors(&input);
        assert_eq!(errors.get("term_weeks_worked"), Some("must be greater than 0"));
        assert_eq!(errors.get("paid_holiday_weeks"), Some("cannot be negative"));
        assert!(!errors.contains("paid_weeks"));
    }

    #[test]
    fn test_defaults_when_deserializing() {
        let input: TermTimeInput = serde_json::from_str(
            r#"{
                "fte_annual_salary": "30000",
                "contracted_weekly_hours": "20",
                "full_time_weekly_hours": "37.5",
                "term_weeks_worked": "39",
                "paid_holiday_weeks": "5.6"
            }"#,
        )
        .unwrap();
        assert_eq!(input.bank_holiday_weeks, Decimal::ZERO);
        assert_eq!(input.payment_schedule, PaymentSchedule::SpreadOverYear);
        assert_eq!(input.daily_divisor, DailyDivisor::Five);
    }

    #[test]
    fn test_oversized_weeks_and_salary_rejected() {
        let mut input = school_support();
        input.fte_annual_salary = Decimal::MAX;
        input.term_weeks_worked = Decimal::MAX;
        input.paid_holiday_weeks = Decimal::MAX;
        let errors = validation_errors(&input);

        assert_eq!(errors.get("fte_annual_salary"), Some("cannot exceed 1000000000"));
        assert_eq!(errors.get("term_weeks_worked"), Some("cannot exceed 52 weeks"));
        assert_eq!(errors.get("paid_holiday_weeks"), Some("cannot exceed 52 weeks"));
        assert!(!errors.contains("paid_weeks"));
    }
}
