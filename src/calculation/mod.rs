//! Calculation logic for the Statutory Calculation Engine.
//!
//! Each calculator is a pure function over an explicit input struct. Inputs
//! are validated before any arithmetic runs; statutory constants come from
//! the [`TaxYearConfig`](crate::config::TaxYearConfig) passed in. The
//! calculators cover pro-rata salary conversion with a take-home estimate,
//! part-time commission, notice periods, maternity and paternity pay,
//! pension contributions, redundancy pay and term-time-only salaries.

mod commission;
mod income_tax;
mod notice_period;
mod pension;
mod pro_rata;
mod redundancy;
mod statutory_pay;
mod term_time;

pub use commission::{
    CommissionInput, CommissionPolicy, CommissionResult, TargetStatus, calculate_commission,
};
pub use income_tax::{
    TakeHomeEstimate, TakeHomeInput, TaxRegion, estimate_take_home, personal_allowance,
};
pub use notice_period::{
    ContractualNotice, NoticeBasis, NoticePeriodInput, NoticePeriodResult, NoticeType,
    NoticeUnit, calculate_notice_period, statutory_notice_weeks,
};
pub use pension::{
    PensionBasis, PensionInput, PensionResult, calculate_pension, pensionable_earnings,
};
pub use pro_rata::{
    ProRataBasis, ProRataInput, ProRataResult, SalaryAmounts, SalaryFrequency,
    calculate_pro_rata,
};
pub use redundancy::{
    RedundancyInput, RedundancyResult, ServiceYear, calculate_redundancy, weeks_for_age,
};
pub use statutory_pay::{
    EligibilityCondition, EligibilityFailure, LeaveType, PayTier, StatutoryPayInput,
    StatutoryPayResult, WeeklyEarnings, calculate_statutory_pay, qualifying_week_date,
};
pub use term_time::{
    DailyDivisor, PaymentSchedule, TermTimeInput, TermTimeResult, calculate_term_time,
    paid_months_for,
};
