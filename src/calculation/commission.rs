//! Part-time commission calculation.
//!
//! The full-time sales target is scaled down by the FTE ratio, and commission
//! is paid either only once that target is reached (`strict`) or on every
//! sale with an optional higher rate above a threshold (`tiered`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineResult;
use crate::models::{
    AuditTrace, BreakdownLine, ProRataRatio, apply_percentage, round_factor, round_pence,
};
use crate::validation::{FieldValidator, Validate};

/// When commission is payable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionPolicy {
    /// Nothing is paid until the pro-rata target is reached.
    Strict,
    /// Every sale earns commission, with an optional second tier.
    Tiered,
}

/// How actual sales compare with the pro-rata target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    /// Sales are above target.
    Exceeded,
    /// Sales equal the target exactly.
    Met,
    /// Sales are below target.
    Below,
}

impl std::fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetStatus::Exceeded => write!(f, "exceeded"),
            TargetStatus::Met => write!(f, "met"),
            TargetStatus::Below => write!(f, "below"),
        }
    }
}

/// Input to [`calculate_commission`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionInput {
    /// Sales target for a full-time employee.
    pub full_time_target: Decimal,
    /// Sales actually achieved.
    pub actual_sales: Decimal,
    /// Full-time weekly hours.
    pub full_time_hours: Decimal,
    /// Weekly hours actually worked.
    pub part_time_hours: Decimal,
    /// Commission percentage on sales.
    pub commission_rate: Decimal,
    /// Payment policy.
    pub policy: CommissionPolicy,
    /// Extra percentage on sales above `second_tier_threshold` (tiered only).
    #[serde(default)]
    pub second_tier_rate: Option<Decimal>,
    /// Sales level above which the second tier applies.
    #[serde(default)]
    pub second_tier_threshold: Option<Decimal>,
    /// Tax percentage to deduct for a post-tax figure.
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
}

impl Validate for CommissionInput {
    fn validate(&self) -> EngineResult<()> {
        let mut v = FieldValidator::new();
        v.amount("full_time_target", self.full_time_target);
        v.non_negative_amount("actual_sales", self.actual_sales);
        let full_time_ok = v.weekly_hours("full_time_hours", self.full_time_hours);
        if v.weekly_hours("part_time_hours", self.part_time_hours) && full_time_ok {
            v.check(
                "part_time_hours",
                self.part_time_hours <= self.full_time_hours,
                "cannot exceed full-time hours",
            );
        }
        v.percentage("commission_rate", self.commission_rate);

        if let (CommissionPolicy::Tiered, Some(rate)) = (self.policy, self.second_tier_rate) {
            v.percentage("second_tier_rate", rate);
            if let Some(threshold) = v.required("second_tier_threshold", self.second_tier_threshold)
            {
                v.amount("second_tier_threshold", threshold);
            }
        }

        if let Some(tax_rate) = self.tax_rate {
            v.in_range("tax_rate", tax_rate, Decimal::ZERO, Decimal::ONE_HUNDRED);
        }

        v.finish()
    }
}

/// The result of a commission calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionResult {
    /// `part_time_hours / full_time_hours`, to 4 decimal places.
    pub fte_ratio: Decimal,
    /// The full-time target scaled by the FTE ratio.
    pub pro_rata_target: Decimal,
    /// Sales as a percentage of the pro-rata target, to 2 decimal places.
    pub target_achievement: Decimal,
    /// Sales against target.
    pub status: TargetStatus,
    /// How far sales fell short of target (zero when met or exceeded).
    pub shortfall: Decimal,
    /// Commission at the main rate.
    pub base_commission: Decimal,
    /// Commission from the second tier.
    pub second_tier_commission: Decimal,
    /// Total commission before tax.
    pub total_commission: Decimal,
    /// Tax deducted, when a tax rate was supplied.
    pub tax_deducted: Option<Decimal>,
    /// Commission after tax, when a tax rate was supplied.
    pub post_tax_commission: Option<Decimal>,
    /// Line items.
    pub breakdown: Vec<BreakdownLine>,
    /// Plain-language summary.
    pub explanation: String,
    /// Rules applied.
    pub audit_trace: AuditTrace,
}

fn target_status(sales: Decimal, target: Decimal) -> TargetStatus {
    match sales.cmp(&target) {
        std::cmp::Ordering::Greater => TargetStatus::Exceeded,
        std::cmp::Ordering::Equal => TargetStatus::Met,
        std::cmp::Ordering::Less => TargetStatus::Below,
    }
}

/// Calculates commission for a part-time salesperson.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::Validation`] when any input is out of
/// range. Second-tier fields are only checked for the tiered policy when a
/// second-tier rate is supplied.
///
/// # Example
///
/// ```
/// use statutory_engine::calculation::{calculate_commission, CommissionInput, CommissionPolicy, TargetStatus};
/// use rust_decimal::Decimal;
///
/// let input = CommissionInput {
///     full_time_target: Decimal::from(10000),
///     actual_sales: Decimal::from(6000),
///     full_time_hours: Decimal::from(40),
///     part_time_hours: Decimal::from(20),
///     commission_rate: Decimal::from(10),
///     policy: CommissionPolicy::Strict,
///     second_tier_rate: None,
///     second_tier_threshold: None,
///     tax_rate: None,
/// };
///
/// let result = calculate_commission(&input).unwrap();
/// assert_eq!(result.status, TargetStatus::Exceeded);
/// assert_eq!(result.total_commission, Decimal::from(600));
/// ```
pub fn calculate_commission(input: &CommissionInput) -> EngineResult<CommissionResult> {
    input.validate()?;

    let mut trace = AuditTrace::default();

    let ratio = ProRataRatio::new(input.part_time_hours, input.full_time_hours);
    let pro_rata_target = ratio.apply(input.full_time_target);
    let achievement = input.actual_sales * Decimal::ONE_HUNDRED / pro_rata_target;
    let status = target_status(input.actual_sales, pro_rata_target);
    let shortfall = (pro_rata_target - input.actual_sales).max(Decimal::ZERO);

    trace.record(
        "pro_rata_target",
        "Pro-Rata Sales Target",
        "Part-time Workers (Prevention of Less Favourable Treatment) Regulations 2000 reg.5",
        serde_json::json!({
            "full_time_target": input.full_time_target.to_string(),
            "part_time_hours": input.part_time_hours.to_string(),
            "full_time_hours": input.full_time_hours.to_string()
        }),
        serde_json::json!({
            "fte_ratio": round_factor(ratio.ratio()).to_string(),
            "pro_rata_target": round_pence(pro_rata_target).to_string(),
            "target_achievement": round_pence(achievement).to_string(),
            "status": status
        }),
        format!(
            "£{} × {} = £{} target; sales of £{} are {}% of target ({})",
            round_pence(input.full_time_target),
            round_factor(ratio.ratio()),
            round_pence(pro_rata_target),
            round_pence(input.actual_sales),
            round_pence(achievement),
            status
        ),
    );

    let (base, second_tier) = match input.policy {
        CommissionPolicy::Strict => {
            let base = if input.actual_sales >= pro_rata_target {
                apply_percentage(input.actual_sales, input.commission_rate)
            } else {
                Decimal::ZERO
            };
            trace.record(
                "strict_commission",
                "Strict Commission Policy",
                "Contractual commission terms",
                serde_json::json!({
                    "actual_sales": input.actual_sales.to_string(),
                    "commission_rate": input.commission_rate.to_string(),
                    "target_reached": input.actual_sales >= pro_rata_target
                }),
                serde_json::json!({ "commission": round_pence(base).to_string() }),
                if base.is_zero() {
                    "Target not reached, so no commission is payable".to_string()
                } else {
                    format!(
                        "Target reached: £{} × {}% = £{}",
                        round_pence(input.actual_sales),
                        input.commission_rate.normalize(),
                        round_pence(base)
                    )
                },
            );
            if status == TargetStatus::Below {
                trace.warn(
                    "target_not_met",
                    format!(
                        "Sales are £{} short of the pro-rata target; no commission under the strict policy",
                        round_pence(shortfall)
                    ),
                    "low",
                );
            }
            (base, Decimal::ZERO)
        }
        CommissionPolicy::Tiered => {
            let base = apply_percentage(input.actual_sales, input.commission_rate);
            let second_tier = match (input.second_tier_rate, input.second_tier_threshold) {
                (Some(rate), Some(threshold)) if input.actual_sales > threshold => {
                    apply_percentage(input.actual_sales - threshold, rate)
                }
                _ => Decimal::ZERO,
            };
            trace.record(
                "tiered_commission",
                "Tiered Commission Policy",
                "Contractual commission terms",
                serde_json::json!({
                    "actual_sales": input.actual_sales.to_string(),
                    "commission_rate": input.commission_rate.to_string(),
                    "second_tier_rate": input.second_tier_rate.map(|r| r.to_string()),
                    "second_tier_threshold": input.second_tier_threshold.map(|t| t.to_string())
                }),
                serde_json::json!({
                    "base_commission": round_pence(base).to_string(),
                    "second_tier_commission": round_pence(second_tier).to_string()
                }),
                format!(
                    "£{} × {}% = £{}, plus £{} from the second tier",
                    round_pence(input.actual_sales),
                    input.commission_rate.normalize(),
                    round_pence(base),
                    round_pence(second_tier)
                ),
            );
            (base, second_tier)
        }
    };

    let total = round_pence(base + second_tier);

    let (tax_deducted, post_tax) = match input.tax_rate {
        Some(tax_rate) => {
            let post_tax = round_pence(total * (Decimal::ONE - tax_rate / Decimal::ONE_HUNDRED));
            (Some(total - post_tax), Some(post_tax))
        }
        None => (None, None),
    };

    let mut breakdown = vec![
        BreakdownLine::new(
            "Pro-rata target",
            round_pence(pro_rata_target),
            format!(
                "£{} full-time target × {}",
                round_pence(input.full_time_target),
                round_factor(ratio.ratio())
            ),
        ),
        BreakdownLine::new(
            "Commission",
            round_pence(base),
            format!("{}% of £{}", input.commission_rate.normalize(), round_pence(input.actual_sales)),
        ),
    ];
    if let (CommissionPolicy::Tiered, Some(rate), Some(threshold)) = (
        input.policy,
        input.second_tier_rate,
        input.second_tier_threshold,
    ) {
        breakdown.push(BreakdownLine::new(
            "Second-tier commission",
            round_pence(second_tier),
            format!("{}% of sales above £{}", rate.normalize(), round_pence(threshold)),
        ));
    }
    breakdown.push(BreakdownLine::new(
        "Total commission",
        total,
        "Before tax",
    ));
    if let (Some(tax_rate), Some(tax), Some(post)) = (input.tax_rate, tax_deducted, post_tax) {
        breakdown.push(BreakdownLine::new(
            "Tax deducted",
            tax,
            format!("{}% of total commission", tax_rate.normalize()),
        ));
        breakdown.push(BreakdownLine::new("Commission after tax", post, "Total less tax"));
    }

    let explanation = format!(
        "The pro-rata target is £{}. Sales of £{} are {}% of target ({}), earning £{} commission under the {} policy.",
        round_pence(pro_rata_target),
        round_pence(input.actual_sales),
        round_pence(achievement),
        status,
        total,
        match input.policy {
            CommissionPolicy::Strict => "strict",
            CommissionPolicy::Tiered => "tiered",
        }
    );

    debug!(
        pro_rata_target = %round_pence(pro_rata_target),
        status = %status,
        total_commission = %total,
        "Commission calculated"
    );

    Ok(CommissionResult {
        fte_ratio: round_factor(ratio.ratio()),
        pro_rata_target: round_pence(pro_rata_target),
        target_achievement: round_pence(achievement),
        status,
        shortfall: round_pence(shortfall),
        base_commission: round_pence(base),
        second_tier_commission: round_pence(second_tier),
        total_commission: total,
        tax_deducted,
        post_tax_commission: post_tax,
        breakdown,
        explanation,
        audit_trace: trace,
    })
}
