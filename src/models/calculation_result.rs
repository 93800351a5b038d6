//! Result records shared by every calculator.
//!
//! Each calculator returns its own result struct, but all of them carry the
//! same building blocks defined here: an ordered breakdown of line items and
//! an [`AuditTrace`] recording the rules that were applied and any
//! informational warnings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line item in a result breakdown.
///
/// # Example
///
/// ```
/// use statutory_engine::models::BreakdownLine;
/// use rust_decimal::Decimal;
///
/// let line = BreakdownLine::new("Employee contribution", Decimal::from(1200), "5% of pensionable earnings");
/// assert_eq!(line.label, "Employee contribution");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownLine {
    /// Short label for the line.
    pub label: String,
    /// The monetary amount for the line, rounded to pence.
    pub amount: Decimal,
    /// How the amount was derived.
    pub description: String,
}

impl BreakdownLine {
    /// Creates a breakdown line.
    pub fn new(
        label: impl Into<String>,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            amount,
            description: description.into(),
        }
    }
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number, starting at 1.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the legislation or guidance behind the rule.
    pub legislation_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings are informational: they never block a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium" or "high").
    pub severity: String,
}

/// The audit trace for a calculation.
///
/// Records every rule applied during the calculation, in order.
///
/// # Example
///
/// ```
/// use statutory_engine::models::AuditTrace;
///
/// let mut trace = AuditTrace::default();
/// trace.record(
///     "pro_rata_ratio",
///     "Pro-Rata Ratio",
///     "Part-time Workers Regulations 2000",
///     serde_json::json!({"actual_hours": "20"}),
///     serde_json::json!({"ratio": "0.5"}),
///     "20 / 40 = 0.5",
/// );
/// assert_eq!(trace.steps[0].step_number, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Appends a step, numbering it after the existing steps.
    pub fn record(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        legislation_ref: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: impl Into<String>,
    ) {
        let step_number = self.steps.len() as u32 + 1;
        self.steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            legislation_ref: legislation_ref.to_string(),
            input,
            output,
            reasoning: reasoning.into(),
        });
    }

    /// Appends a warning.
    pub fn warn(&mut self, code: &str, message: impl Into<String>, severity: &str) {
        self.warnings.push(AuditWarning {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        });
    }

    /// Returns true if a warning with the given code was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }

    /// Returns the step recorded for a rule, if any.
    pub fn step(&self, rule_id: &str) -> Option<&AuditStep> {
        self.steps.iter().find(|s| s.rule_id == rule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_numbers_steps_sequentially() {
        let mut trace = AuditTrace::default();
        for rule in ["a", "b", "c"] {
            trace.record(
                rule,
                rule,
                "ref",
                serde_json::json!({}),
                serde_json::json!({}),
                "",
            );
        }
        let numbers: Vec<u32> = trace.steps.iter().map(|s| s.step_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(trace.step("b").unwrap().step_number, 2);
    }

    #[test]
    fn test_warn_and_has_warning() {
        let mut trace = AuditTrace::default();
        trace.warn("not_eligible", "Under 22", "medium");
        assert!(trace.has_warning("not_eligible"));
        assert!(!trace.has_warning("other"));
        assert_eq!(trace.warnings[0].severity, "medium");
    }

    #[test]
    fn test_breakdown_line_serialization() {
        let line = BreakdownLine::new("Total", Decimal::new(120000, 2), "sum");
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["label"], "Total");
        assert_eq!(json["amount"], "1200.00");
        assert_eq!(json["description"], "sum");
    }

    #[test]
    fn test_audit_trace_round_trip() {
        let mut trace = AuditTrace::default();
        trace.record(
            "cap",
            "Weekly Pay Cap",
            "ERA 1996 s.227",
            serde_json::json!({"weekly_wage": "900"}),
            serde_json::json!({"capped": "719"}),
            "capped",
        );
        let json = serde_json::to_string(&trace).unwrap();
        let back: AuditTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(trace, back);
    }
}
