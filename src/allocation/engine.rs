//! Settlement computation entry points.
//!
//! Turns line items, assignments, tax and tip into one settlement row per
//! member. The computation is pure and deterministic: members are kept in
//! first-seen order across the assignments, line items in the order
//! supplied, and assignment rows within an item in the order supplied.
//! Remainder absorption depends on that order, so no unordered collection
//! is ever iterated.

use std::collections::{HashMap, HashSet};

use crate::models::{
    Assignment, AuditTrace, Cents, LineItem, SettlementBreakdown, SettlementRow, SettlementTotals,
    Strategy,
};

use super::charge_allocation::{Charge, Participant, allocate_charge};
use super::item_allocation::allocate_line_item;

/// Warning raised when an assignment references a line item that was not supplied.
pub const WARNING_UNMATCHED_ASSIGNMENT: &str = "UNMATCHED_ASSIGNMENT";
/// Warning raised when a ratio-mode item has no positive total weight.
pub const WARNING_ZERO_WEIGHT_ITEM: &str = "ZERO_WEIGHT_ITEM";
/// Warning raised when tax or tip is positive but nobody has items.
pub const WARNING_UNALLOCATED_CHARGE: &str = "UNALLOCATED_CHARGE";

#[derive(Debug)]
struct MemberTotals {
    member_id: String,
    items: Cents,
    tax: Cents,
    tip: Cents,
}

/// Per-member running totals in first-seen order.
#[derive(Debug, Default)]
struct MemberLedger {
    entries: Vec<MemberTotals>,
    index: HashMap<String, usize>,
}

impl MemberLedger {
    fn from_assignments(assignments: &[Assignment]) -> Self {
        let mut ledger = Self::default();
        for a in assignments {
            if !ledger.index.contains_key(&a.member_id) {
                ledger.index.insert(a.member_id.clone(), ledger.entries.len());
                ledger.entries.push(MemberTotals {
                    member_id: a.member_id.clone(),
                    items: 0,
                    tax: 0,
                    tip: 0,
                });
            }
        }
        ledger
    }

    fn entry_mut(&mut self, member_id: &str) -> Option<&mut MemberTotals> {
        let idx = *self.index.get(member_id)?;
        self.entries.get_mut(idx)
    }

    fn add_items(&mut self, member_id: &str, amount: Cents) {
        if let Some(entry) = self.entry_mut(member_id) {
            entry.items += amount;
        }
    }

    fn set_charge(&mut self, charge: Charge, member_id: &str, amount: Cents) {
        if let Some(entry) = self.entry_mut(member_id) {
            match charge {
                Charge::Tax => entry.tax = amount,
                Charge::Tip => entry.tip = amount,
            }
        }
    }

    /// Members with a positive items total, weighted by it.
    fn participants(&self) -> Vec<Participant> {
        self.entries
            .iter()
            .filter(|e| e.items > 0)
            .map(|e| Participant {
                member_id: e.member_id.clone(),
                weight: e.items,
            })
            .collect()
    }

    fn into_rows(self) -> Vec<SettlementRow> {
        self.entries
            .into_iter()
            .map(|e| SettlementRow::new(e.member_id, e.items, e.tax, e.tip))
            .collect()
    }
}

/// Computes one settlement row per member observed in `assignments`.
///
/// Guarantees, for any input:
/// - the items totals of all rows add up to the sum of `line_total` over
///   line items with at least one assignment (zero-weight ratio items
///   excepted, which allocate nothing);
/// - tax shares add up to `tax` whenever `tax > 0` and some member has a
///   positive items total, and likewise for tip;
/// - the same input always yields the same output.
///
/// Assignments referencing a line item absent from `line_items` contribute
/// nothing, though their member still gets a row.
///
/// Sums are formed in `i64`. Callers keep line totals, tax and tip
/// non-negative and their combined total within
/// [`MAX_RECEIPT_AMOUNT`](crate::models::MAX_RECEIPT_AMOUNT), and share
/// terms positive; `workflow::validate_receipt` and
/// `workflow::validate_input` enforce this at the boundary.
///
/// # Examples
///
/// ```
/// use receipt_split::allocation::compute_settlements;
/// use receipt_split::models::{Assignment, LineItem, Strategy};
///
/// let items = vec![LineItem::new("item_1", 1000)];
/// let assignments = Assignment::equal_split("item_1", &["alice", "bob"]);
///
/// let rows = compute_settlements(&items, &assignments, 100, 0, Strategy::Proportional, Strategy::Equal);
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0].final_amount, 550);
/// assert_eq!(rows[1].final_amount, 550);
/// ```
pub fn compute_settlements(
    line_items: &[LineItem],
    assignments: &[Assignment],
    tax: Cents,
    tip: Cents,
    tax_strategy: Strategy,
    tip_strategy: Strategy,
) -> Vec<SettlementRow> {
    compute_settlement_breakdown(line_items, assignments, tax, tip, tax_strategy, tip_strategy).rows
}

/// Computes settlement rows together with totals and an audit trace.
///
/// The rows are identical to those of [`compute_settlements`]. The audit
/// trace has one step per allocated line item followed by a step each for
/// tax and tip when they are positive, plus warnings for unmatched
/// assignments, zero-weight items and charges nobody could carry.
pub fn compute_settlement_breakdown(
    line_items: &[LineItem],
    assignments: &[Assignment],
    tax: Cents,
    tip: Cents,
    tax_strategy: Strategy,
    tip_strategy: Strategy,
) -> SettlementBreakdown {
    let mut ledger = MemberLedger::from_assignments(assignments);
    let mut audit = AuditTrace::default();

    // Group rows by line item, keeping supplied order within each item.
    let mut by_item: HashMap<&str, Vec<&Assignment>> = HashMap::new();
    for a in assignments {
        by_item.entry(a.line_item_id.as_str()).or_default().push(a);
    }

    let known_items: HashSet<&str> = line_items.iter().map(|item| item.id.as_str()).collect();
    let mut reported: HashSet<&str> = HashSet::new();
    for a in assignments {
        let item_id = a.line_item_id.as_str();
        if !known_items.contains(item_id) && reported.insert(item_id) {
            audit.warn(
                WARNING_UNMATCHED_ASSIGNMENT,
                format!(
                    "Assignments reference line item '{}', which was not supplied; they contribute nothing",
                    item_id
                ),
            );
        }
    }

    for item in line_items {
        let Some(rows) = by_item.get(item.id.as_str()) else {
            continue;
        };

        let result = allocate_line_item(item, rows, audit.next_step_number());
        if result.skipped {
            audit.warn(
                WARNING_ZERO_WEIGHT_ITEM,
                format!(
                    "Line item '{}' has no positive total weight; {} left unallocated",
                    item.id, item.line_total
                ),
            );
        }
        for share in &result.shares {
            ledger.add_items(&share.member_id, share.amount);
        }
        audit.steps.push(result.audit_step);
    }

    for (charge, amount, strategy) in [
        (Charge::Tax, tax, tax_strategy),
        (Charge::Tip, tip, tip_strategy),
    ] {
        let participants = ledger.participants();
        let Some(result) =
            allocate_charge(charge, amount, &participants, strategy, audit.next_step_number())
        else {
            continue;
        };

        if result.unallocated != 0 {
            audit.warn(
                WARNING_UNALLOCATED_CHARGE,
                format!(
                    "No member has items to carry {}; {} left unallocated",
                    charge, result.unallocated
                ),
            );
        }
        for share in &result.shares {
            ledger.set_charge(charge, &share.member_id, share.amount);
        }
        audit.steps.push(result.audit_step);
    }

    let rows = ledger.into_rows();
    let totals = SettlementTotals::from_rows(&rows);

    SettlementBreakdown {
        rows,
        totals,
        audit,
    }
}
