//! Notice period and final pay.
//!
//! Statutory minimum notice under the Employment Rights Act 1996 s.86:
//!
//! | Service            | Resignation | Dismissal                          |
//! |--------------------|-------------|------------------------------------|
//! | under 30 days      | none        | none                               |
//! | 30 days to 2 years | 1 week      | 1 week                             |
//! | 2 years or more    | 1 week      | 1 week per full year, at most 12   |
//!
//! A declared contractual notice period replaces the statutory figure for the
//! pay calculation, but the statutory minimum is still reported.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineResult;
use crate::models::{
    AuditTrace, BreakdownLine, DAYS_PER_WEEK, PeriodSpan, ServiceLength, WORKING_DAYS_PER_WEEK,
    round_pence,
};
use crate::validation::{FieldValidator, Validate};

const MINIMUM_SERVICE_DAYS: i64 = 30;
const LONG_SERVICE_DAYS: i64 = 730;
const DAYS_PER_SERVICE_YEAR: i64 = 365;
const MAXIMUM_STATUTORY_WEEKS: i64 = 12;
const CONTRACTUAL_NOTICE_LIMIT_WEEKS: Decimal = Decimal::from_parts(520, 0, 0, false, 0);

/// Who is ending the employment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeType {
    /// The employee is resigning.
    Resignation,
    /// The employer is dismissing the employee.
    Dismissal,
}

/// Unit of a contractual notice period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeUnit {
    /// Weeks.
    Weeks,
    /// Calendar days.
    Days,
}

/// A notice period written into the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractualNotice {
    /// Length of the period, in `unit`s.
    pub period: Decimal,
    /// Unit of `period`.
    pub unit: NoticeUnit,
}

impl ContractualNotice {
    /// The period expressed in weeks.
    pub fn weeks(&self) -> Decimal {
        match self.unit {
            NoticeUnit::Weeks => self.period,
            NoticeUnit::Days => self.period / DAYS_PER_WEEK,
        }
    }
}

/// Which notice period determined the pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeBasis {
    /// The statutory minimum.
    Statutory,
    /// The contractual period.
    Contractual,
}

/// Input to [`calculate_notice_period`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticePeriodInput {
    /// Resignation or dismissal.
    pub notice_type: NoticeType,
    /// First day of employment.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Date notice is given. Defaults to today.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Contracted weekly hours.
    #[serde(default)]
    pub weekly_hours: Option<Decimal>,
    /// Gross weekly wage.
    #[serde(default)]
    pub weekly_wage: Option<Decimal>,
    /// Gross hourly rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// Contractual notice, when the contract states one.
    #[serde(default)]
    pub contractual_notice: Option<ContractualNotice>,
}

impl NoticePeriodInput {
    /// Validates every field, returning the start date and weekly hours.
    fn checked(&self) -> EngineResult<(NaiveDate, Decimal)> {
        let mut v = FieldValidator::new();

        let start = v.required("start_date", self.start_date);
        if let (Some(start), Some(end)) = (start, self.end_date) {
            v.check("end_date", end > start, "must be after the start date");
        }

        let hours = v.required("weekly_hours", self.weekly_hours);
        if let Some(hours) = hours {
            v.weekly_hours("weekly_hours", hours);
        }

        match (self.weekly_wage, self.hourly_rate) {
            (None, None) => {
                v.check("weekly_wage", false, "weekly wage or hourly rate is required");
            }
            (wage, rate) => {
                if let Some(wage) = wage {
                    v.amount("weekly_wage", wage);
                }
                if let Some(rate) = rate {
                    v.amount("hourly_rate", rate);
                }
            }
        }

        if let Some(contractual) = self.contractual_notice {
            if v.positive("contractual_notice.period", contractual.period) {
                v.check(
                    "contractual_notice.period",
                    contractual.weeks() <= CONTRACTUAL_NOTICE_LIMIT_WEEKS,
                    format!("cannot exceed {} weeks", CONTRACTUAL_NOTICE_LIMIT_WEEKS),
                );
            }
        }

        v.finish_with(start.zip(hours))
    }
}

impl Validate for NoticePeriodInput {
    fn validate(&self) -> EngineResult<()> {
        self.checked().map(|_| ())
    }
}

/// The result of a notice period calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticePeriodResult {
    /// Resignation or dismissal.
    pub notice_type: NoticeType,
    /// First day of employment.
    pub start_date: NaiveDate,
    /// Date notice is given (today when not supplied).
    pub end_date: NaiveDate,
    /// Days between start and end.
    pub length_of_service_days: i64,
    /// Service in whole years, months and days.
    pub service_length: ServiceLength,
    /// The statutory minimum, in weeks.
    pub statutory_notice_weeks: Decimal,
    /// The contractual period in weeks, when declared.
    pub contractual_notice_weeks: Option<Decimal>,
    /// The notice period used for pay.
    pub notice_weeks: Decimal,
    /// Where `notice_weeks` came from.
    pub notice_basis: NoticeBasis,
    /// Last day of notice; `None` only if the date is out of range.
    pub notice_end_date: Option<NaiveDate>,
    /// Gross weekly wage.
    pub weekly_wage: Decimal,
    /// Weekly wage ÷ 5.
    pub daily_rate: Decimal,
    /// Gross hourly rate.
    pub hourly_rate: Decimal,
    /// Pay for the notice period.
    pub final_pay: Decimal,
    /// Line items.
    pub breakdown: Vec<BreakdownLine>,
    /// Plain-language summary.
    pub explanation: String,
    /// Rules applied.
    pub audit_trace: AuditTrace,
}

/// Returns the statutory minimum notice in whole weeks.
///
/// # Example
///
/// ```
/// use statutory_engine::calculation::{statutory_notice_weeks, NoticeType};
///
/// assert_eq!(statutory_notice_weeks(NoticeType::Dismissal, 365 * 30), 12);
/// assert_eq!(statutory_notice_weeks(NoticeType::Resignation, 365 * 30), 1);
/// assert_eq!(statutory_notice_weeks(NoticeType::Dismissal, 29), 0);
/// ```
pub fn statutory_notice_weeks(notice_type: NoticeType, service_days: i64) -> i64 {
    if service_days < MINIMUM_SERVICE_DAYS {
        return 0;
    }
    match notice_type {
        NoticeType::Resignation => 1,
        NoticeType::Dismissal if service_days < LONG_SERVICE_DAYS => 1,
        NoticeType::Dismissal => (service_days / DAYS_PER_SERVICE_YEAR).min(MAXIMUM_STATUTORY_WEEKS),
    }
}

fn statutory_reference(notice_type: NoticeType) -> &'static str {
    match notice_type {
        NoticeType::Resignation => "Employment Rights Act 1996 s.86(2)",
        NoticeType::Dismissal => "Employment Rights Act 1996 s.86(1)",
    }
}

/// Calculates the notice period and the pay due for it.
///
/// `today` is used when the input has no end date.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Validation`] when the start date or
/// weekly hours are missing, the end date is not after the start date,
/// neither a weekly wage nor an hourly rate is given, a wage or rate exceeds
/// the amount limit, or a declared contractual period is not positive or
/// longer than 520 weeks.
pub fn calculate_notice_period(
    input: &NoticePeriodInput,
    today: NaiveDate,
) -> EngineResult<NoticePeriodResult> {
    let (start_date, weekly_hours) = input.checked()?;
    let end_date = input.end_date.unwrap_or(today);

    let mut trace = AuditTrace::default();

    let span = PeriodSpan::new(start_date.min(end_date), start_date.max(end_date));
    let service_days = span.map(|span| span.total_days()).unwrap_or(0);
    let service_length = span.map(|span| span.service_length()).unwrap_or_default();
    trace.record(
        "length_of_service",
        "Length of Service",
        "Employment Rights Act 1996 s.210",
        serde_json::json!({
            "start_date": start_date.to_string(),
            "end_date": end_date.to_string()
        }),
        serde_json::json!({
            "days": service_days,
            "service_length": service_length.to_string()
        }),
        format!("{} to {} is {} days ({})", start_date, end_date, service_days, service_length),
    );

    let statutory = Decimal::from(statutory_notice_weeks(input.notice_type, service_days));
    trace.record(
        "statutory_notice",
        "Statutory Minimum Notice",
        statutory_reference(input.notice_type),
        serde_json::json!({
            "notice_type": input.notice_type,
            "service_days": service_days
        }),
        serde_json::json!({ "weeks": statutory.to_string() }),
        match (input.notice_type, service_days) {
            (_, d) if d < MINIMUM_SERVICE_DAYS => {
                "Under 30 days of service: no statutory notice".to_string()
            }
            (NoticeType::Resignation, _) => "An employee resigning must give 1 week".to_string(),
            (NoticeType::Dismissal, d) if d < LONG_SERVICE_DAYS => {
                "Under 2 years of service: 1 week".to_string()
            }
            (NoticeType::Dismissal, _) => format!(
                "{} full years of service: {} weeks (at most 12)",
                service_days / DAYS_PER_SERVICE_YEAR,
                statutory
            ),
        },
    );

    let contractual_weeks = input.contractual_notice.map(|c| c.weeks());
    let (notice_weeks, notice_basis) = match contractual_weeks {
        Some(weeks) => {
            trace.record(
                "contractual_notice",
                "Contractual Notice Override",
                "Contract of employment",
                serde_json::json!({
                    "period": input.contractual_notice.map(|c| c.period.to_string()),
                    "unit": input.contractual_notice.map(|c| c.unit)
                }),
                serde_json::json!({ "weeks": weeks.to_string() }),
                format!("The contract specifies {} weeks, which replaces the statutory figure", weeks.normalize()),
            );
            if weeks < statutory {
                warn!(
                    contractual_weeks = %weeks,
                    statutory_weeks = %statutory,
                    "Contractual notice is shorter than the statutory minimum"
                );
                trace.warn(
                    "contractual_below_statutory",
                    format!(
                        "The contractual notice of {} weeks is shorter than the statutory minimum of {} weeks; the statutory minimum still applies in law",
                        weeks.normalize(),
                        statutory
                    ),
                    "high",
                );
            }
            (weeks, NoticeBasis::Contractual)
        }
        None => (statutory, NoticeBasis::Statutory),
    };

    if statutory.is_zero() && notice_basis == NoticeBasis::Statutory {
        trace.warn(
            "no_statutory_notice",
            "Less than 30 days of service: no statutory notice is required",
            "low",
        );
    }

    let weekly_wage = match (input.weekly_wage, input.hourly_rate) {
        (Some(wage), _) => wage,
        (None, Some(rate)) => rate * weekly_hours,
        (None, None) => Decimal::ZERO,
    };
    let hourly_rate = input.hourly_rate.unwrap_or(weekly_wage / weekly_hours);
    let daily_rate = weekly_wage / WORKING_DAYS_PER_WEEK;
    let final_pay = round_pence(notice_weeks * weekly_wage);

    trace.record(
        "final_pay",
        "Notice Pay",
        "Employment Rights Act 1996 s.88",
        serde_json::json!({
            "notice_weeks": notice_weeks.to_string(),
            "weekly_wage": weekly_wage.to_string()
        }),
        serde_json::json!({ "final_pay": final_pay.to_string() }),
        format!(
            "{} weeks × £{} = £{}",
            notice_weeks.normalize(),
            round_pence(weekly_wage),
            final_pay
        ),
    );

    let notice_days = (notice_weeks * DAYS_PER_WEEK).ceil().to_u64().unwrap_or(0);
    let notice_end_date = end_date.checked_add_days(Days::new(notice_days));

    let breakdown = vec![
        BreakdownLine::new(
            "Weekly wage",
            round_pence(weekly_wage),
            match input.weekly_wage {
                Some(_) => "As provided".to_string(),
                None => format!("£{} × {} hours", round_pence(hourly_rate), weekly_hours.normalize()),
            },
        ),
        BreakdownLine::new("Daily rate", round_pence(daily_rate), "Weekly wage ÷ 5"),
        BreakdownLine::new("Hourly rate", round_pence(hourly_rate), match input.hourly_rate {
            Some(_) => "As provided".to_string(),
            None => format!("Weekly wage ÷ {} hours", weekly_hours.normalize()),
        }),
        BreakdownLine::new(
            "Notice pay",
            final_pay,
            format!(
                "{} weeks of {} notice",
                notice_weeks.normalize(),
                match notice_basis {
                    NoticeBasis::Statutory => "statutory",
                    NoticeBasis::Contractual => "contractual",
                }
            ),
        ),
    ];

    let explanation = format!(
        "After {} of service, the {} notice period is {} weeks, ending on {}. Notice pay is £{}.",
        service_length,
        match notice_basis {
            NoticeBasis::Statutory => "statutory",
            NoticeBasis::Contractual => "contractual",
        },
        notice_weeks.normalize(),
        notice_end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "an out-of-range date".to_string()),
        final_pay
    );

    debug!(
        service_days,
        notice_weeks = %notice_weeks,
        final_pay = %final_pay,
        "Notice period calculated"
    );

    Ok(NoticePeriodResult {
        notice_type: input.notice_type,
        start_date,
        end_date,
        length_of_service_days: service_days,
        service_length,
        statutory_notice_weeks: statutory,
        contractual_notice_weeks: contractual_weeks,
        notice_weeks,
        notice_basis,
        notice_end_date,
        weekly_wage: round_pence(weekly_wage),
        daily_rate: round_pence(daily_rate),
        hourly_rate: round_pence(hourly_rate),
        final_pay,
        breakdown,
        explanation,
        audit_trace: trace,
    })
}
