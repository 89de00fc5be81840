//! Line item allocation.
//!
//! Divides one line item's total among the members assigned to it,
//! according to the encoding detected for its assignment rows.

use serde_json::json;

use crate::models::{AllocationMode, Assignment, AuditStep, Cents, LineItem};

use super::mode_detection::detect_mode;
use super::rounding::floor_share;

/// An amount credited to one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberShare {
    /// The member receiving the amount.
    pub member_id: String,
    /// The amount in minor units.
    pub amount: Cents,
}

impl MemberShare {
    fn new(member_id: &str, amount: Cents) -> Self {
        Self {
            member_id: member_id.to_string(),
            amount,
        }
    }
}

/// The result of allocating one line item, including the audit step.
#[derive(Debug, Clone)]
pub struct ItemAllocationResult {
    /// The encoding detected for the item's rows.
    pub mode: AllocationMode,
    /// Per-row shares, in assignment order. Empty when the item was skipped.
    pub shares: Vec<MemberShare>,
    /// True when a ratio item had no positive total weight and allocated nothing.
    pub skipped: bool,
    /// The audit step recording this allocation.
    pub audit_step: AuditStep,
}

/// Allocates a line item among its assignment rows.
///
/// Manual rows credit each member exactly their numerator. Ratio rows credit
/// every row but the last `floor(line_total * weight / total_weight)`, and
/// the last row receives whatever remains, so the shares always add up to
/// the line total. A ratio item whose weights do not sum to a positive
/// number is skipped.
///
/// `assignments` must all reference `item` and be in a stable order; the
/// last row absorbs the rounding remainder.
///
/// # Examples
///
/// ```
/// use receipt_split::allocation::allocate_line_item;
/// use receipt_split::models::{Assignment, LineItem};
///
/// let item = LineItem::new("item_3", 800);
/// let rows = Assignment::equal_split("item_3", &["a", "b", "c"]);
/// let refs: Vec<&Assignment> = rows.iter().collect();
///
/// let result = allocate_line_item(&item, &refs, 1);
/// let amounts: Vec<i64> = result.shares.iter().map(|s| s.amount).collect();
/// assert_eq!(amounts, vec![266, 266, 268]);
/// ```
pub fn allocate_line_item(
    item: &LineItem,
    assignments: &[&Assignment],
    step_number: u32,
) -> ItemAllocationResult {
    let mode = detect_mode(item, assignments);

    let input = json!({
        "line_total": item.line_total,
        "assignments": assignments
            .iter()
            .map(|a| json!({
                "member_id": a.member_id,
                "share_numerator": a.share_numerator,
                "share_denominator": a.share_denominator,
            }))
            .collect::<Vec<_>>(),
    });

    let (shares, skipped, reasoning) = match mode {
        AllocationMode::Manual => allocate_manual(item, assignments),
        AllocationMode::Ratio => allocate_ratio(item, assignments),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "item_allocation".to_string(),
        rule_name: "Line Item Allocation".to_string(),
        subject: item.id.clone(),
        input,
        output: json!({
            "mode": mode.as_str(),
            "skipped": skipped,
            "shares": shares
                .iter()
                .map(|s| json!({ "member_id": s.member_id, "amount": s.amount }))
                .collect::<Vec<_>>(),
        }),
        reasoning,
    };

    ItemAllocationResult {
        mode,
        shares,
        skipped,
        audit_step,
    }
}

fn allocate_manual(item: &LineItem, assignments: &[&Assignment]) -> (Vec<MemberShare>, bool, String) {
    let shares: Vec<MemberShare> = assignments
        .iter()
        .map(|a| MemberShare::new(&a.member_id, a.share_numerator))
        .collect();

    let terms: Vec<String> = shares.iter().map(|s| s.amount.to_string()).collect();
    let reasoning = format!(
        "Manual amounts {} = {} match line total",
        terms.join(" + "),
        item.line_total
    );

    (shares, false, reasoning)
}

fn allocate_ratio(item: &LineItem, assignments: &[&Assignment]) -> (Vec<MemberShare>, bool, String) {
    let total_weight: i128 = assignments
        .iter()
        .map(|a| i128::from(a.share_numerator))
        .sum();

    if total_weight <= 0 {
        return (
            Vec::new(),
            true,
            format!(
                "Total weight is {}; {} left unallocated",
                total_weight,
                item.line_total
            ),
        );
    }

    let mut shares = Vec::with_capacity(assignments.len());
    let mut allocated: Cents = 0;
    let last = assignments.len() - 1;

    for (i, a) in assignments.iter().enumerate() {
        let amount = if i == last {
            item.line_total - allocated
        } else {
            let share = floor_share(item.line_total, i128::from(a.share_numerator), total_weight);
            allocated += share;
            share
        };
        shares.push(MemberShare::new(&a.member_id, amount));
    }

    let weights: Vec<String> = assignments
        .iter()
        .map(|a| a.share_numerator.to_string())
        .collect();
    let remainder_holder = &assignments[last].member_id;
    let reasoning = format!(
        "Ratio split of {} by weights {}; {} receives the remainder {}",
        item.line_total,
        weights.join(":"),
        remainder_holder,
        item.line_total - allocated
    );

    (shares, false, reasoning)
}
