//! Settlement output models.
//!
//! This module contains the [`SettlementRow`] produced per member and the
//! [`SettlementBreakdown`] that pairs the rows with totals and an audit
//! trace of every allocation decision.

use serde::{Deserialize, Serialize};

use super::Cents;

/// The computed settlement for one member of a receipt.
///
/// `final_amount` is always `items_total + tax_share + tip_share`.
///
/// # Example
///
/// ```
/// use receipt_split::models::SettlementRow;
///
/// let row = SettlementRow::new("alice", 1800, 180, 0);
/// assert_eq!(row.final_amount, 1980);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRow {
    /// The member this row belongs to.
    pub member_id: String,
    /// Sum of the member's allocated item shares.
    pub items_total: Cents,
    /// The member's share of tax.
    pub tax_share: Cents,
    /// The member's share of tip.
    pub tip_share: Cents,
    /// Total owed by the member.
    pub final_amount: Cents,
}

impl SettlementRow {
    /// Creates a row, deriving the final amount from its parts.
    pub fn new(
        member_id: impl Into<String>,
        items_total: Cents,
        tax_share: Cents,
        tip_share: Cents,
    ) -> Self {
        Self {
            member_id: member_id.into(),
            items_total,
            tax_share,
            tip_share,
            final_amount: items_total + tax_share + tip_share,
        }
    }
}

/// Aggregated totals over all settlement rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTotals {
    /// Sum of all items totals.
    pub items_total: Cents,
    /// Sum of all tax shares.
    pub tax_total: Cents,
    /// Sum of all tip shares.
    pub tip_total: Cents,
    /// Sum of all final amounts.
    pub grand_total: Cents,
}

impl SettlementTotals {
    /// Sums the given rows.
    pub fn from_rows(rows: &[SettlementRow]) -> Self {
        rows.iter().fold(Self::default(), |mut totals, row| {
            totals.items_total += row.items_total;
            totals.tax_total += row.tax_share;
            totals.tip_total += row.tip_share;
            totals.grand_total += row.final_amount;
            totals
        })
    }
}

/// A single step in the audit trace recording an allocation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// Identifier of the rule applied (e.g. "item_allocation").
    pub rule_id: String,
    /// Human-readable name of the rule.
    pub rule_name: String,
    /// What the rule was applied to: a line item id, "tax" or "tip".
    pub subject: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A condition noticed during allocation that did not change the result
/// but may deserve attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
}

/// The complete audit trace for a settlement computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// All allocation steps, in the order they were applied.
    pub steps: Vec<AuditStep>,
    /// Warnings raised along the way.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Returns the number to give the next recorded step.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Records a warning.
    pub fn warn(&mut self, code: &str, message: impl Into<String>) {
        self.warnings.push(AuditWarning {
            code: code.to_string(),
            message: message.into(),
        });
    }

    /// Returns true when a warning with the given code was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// The full result of a settlement computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementBreakdown {
    /// One row per member, in first-seen order across the assignments.
    pub rows: Vec<SettlementRow>,
    /// Sums over `rows`.
    pub totals: SettlementTotals,
    /// Every allocation decision that produced `rows`.
    pub audit: AuditTrace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_final_amount_is_sum_of_parts() {
        let row = SettlementRow::new("bob", 867, 87, 50);
        assert_eq!(row.final_amount, 1004);
    }

    #[test]
    fn test_totals_from_rows() {
        let rows = vec![
            SettlementRow::new("a", 1800, 180, 0),
            SettlementRow::new("b", 867, 87, 0),
            SettlementRow::new("c", 1133, 113, 0),
        ];

        let totals = SettlementTotals::from_rows(&rows);
        assert_eq!(totals.items_total, 3800);
        assert_eq!(totals.tax_total, 380);
        assert_eq!(totals.tip_total, 0);
        assert_eq!(totals.grand_total, 4180);
    }

    #[test]
    fn test_totals_from_no_rows_are_zero() {
        assert_eq!(SettlementTotals::from_rows(&[]), SettlementTotals::default());
    }

    #[test]
    fn test_audit_trace_step_numbers_start_at_one() {
        let trace = AuditTrace::default();
        assert_eq!(trace.next_step_number(), 1);
    }

    #[test]
    fn test_audit_trace_records_warnings() {
        let mut trace = AuditTrace::default();
        trace.warn("ZERO_WEIGHT_ITEM", "item_1 skipped");

        assert!(trace.has_warning("ZERO_WEIGHT_ITEM"));
        assert!(!trace.has_warning("UNALLOCATED_CHARGE"));
    }

    #[test]
    fn test_row_serializes_snake_case_fields() {
        let json = serde_json::to_value(SettlementRow::new("a", 100, 10, 5)).unwrap();
        assert_eq!(json["items_total"], 100);
        assert_eq!(json["final_amount"], 115);
    }
}
