//! Date spans used for length-of-service and qualifying-week arithmetic.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// A length of service expressed as whole calendar years, months and days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLength {
    /// Whole years.
    pub years: u32,
    /// Whole months after the years.
    pub months: u32,
    /// Remaining days after the months.
    pub days: u32,
}

impl std::fmt::Display for ServiceLength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} years, {} months, {} days",
            self.years, self.months, self.days
        )
    }
}

/// A span between two dates where `start_date < end_date`.
///
/// # Example
///
/// ```
/// use statutory_engine::models::PeriodSpan;
/// use chrono::NaiveDate;
///
/// let span = PeriodSpan::new(
///     NaiveDate::from_ymd_opt(2020, 1, 15).unwrap(),
///     NaiveDate::from_ymd_opt(2023, 3, 20).unwrap(),
/// )
/// .unwrap();
///
/// let length = span.service_length();
/// assert_eq!((length.years, length.months, length.days), (3, 2, 5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSpan {
    /// The first date of the span.
    pub start_date: NaiveDate,
    /// The last date of the span.
    pub end_date: NaiveDate,
}

impl PeriodSpan {
    /// Creates a span, returning `None` unless `start_date < end_date`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Option<Self> {
        (start_date < end_date).then_some(Self {
            start_date,
            end_date,
        })
    }

    /// Number of days from start to end.
    pub fn total_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Number of complete 7-day weeks from start to end.
    pub fn whole_weeks(&self) -> i64 {
        self.total_days() / 7
    }

    /// Splits the span into whole calendar years, months and remaining days.
    ///
    /// Month arithmetic clamps to the end of shorter months, so a span from
    /// 31 January to 1 March counts one month plus the days after 28/29 February.
    pub fn service_length(&self) -> ServiceLength {
        let start = self.start_date;
        let end = self.end_date;

        let mut total_months =
            (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
        if end.day() < start.day() {
            total_months -= 1;
        }
        let total_months = total_months.max(0) as u32;

        let anchor = start
            .checked_add_months(Months::new(total_months))
            .unwrap_or(start);
        let days = (end - anchor).num_days().max(0) as u32;

        ServiceLength {
            years: total_months / 12,
            months: total_months % 12,
            days,
        }
    }
}
