//! Tax and tip allocation.
//!
//! A receipt-level charge is divided among the members whose items total is
//! above zero, either in proportion to those totals or evenly.

use std::fmt;

use serde_json::json;

use crate::models::{AuditStep, Cents, Strategy};

use super::item_allocation::MemberShare;
use super::rounding::{rounded_share, split_evenly};

/// A receipt-level charge divided after items are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charge {
    /// Sales tax.
    Tax,
    /// Gratuity.
    Tip,
}

impl Charge {
    /// Returns the lowercase name of the charge.
    pub fn as_str(&self) -> &'static str {
        match self {
            Charge::Tax => "tax",
            Charge::Tip => "tip",
        }
    }
}

impl fmt::Display for Charge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member eligible to carry part of a charge, weighted by items total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// The participating member.
    pub member_id: String,
    /// The member's items total. Always above zero.
    pub weight: Cents,
}

/// The result of allocating a charge, including the audit step.
#[derive(Debug, Clone)]
pub struct ChargeAllocationResult {
    /// Per-participant shares, in participant order.
    pub shares: Vec<MemberShare>,
    /// The part of the charge nobody was eligible to carry.
    pub unallocated: Cents,
    /// The audit step recording this allocation.
    pub audit_step: AuditStep,
}

/// Divides `amount` among `participants` using `strategy`.
///
/// Returns `None` when `amount` is not positive: the charge is skipped and
/// no shares are touched.
///
/// With [`Strategy::Proportional`], every participant but the last gets
/// `round(amount * weight / total_weight)` (half away from zero) and the last
/// gets the exact remainder. With [`Strategy::Equal`], each gets
/// `floor(amount / n)` and the first `amount mod n` participants get one
/// extra unit. With no participants the whole amount is left unallocated.
///
/// # Examples
///
/// ```
/// use receipt_split::allocation::{allocate_charge, Charge, Participant};
/// use receipt_split::models::Strategy;
///
/// let participants = vec![
///     Participant { member_id: "a".to_string(), weight: 1 },
///     Participant { member_id: "b".to_string(), weight: 1 },
///     Participant { member_id: "c".to_string(), weight: 1 },
/// ];
///
/// let result = allocate_charge(Charge::Tip, 100, &participants, Strategy::Equal, 1).unwrap();
/// let amounts: Vec<i64> = result.shares.iter().map(|s| s.amount).collect();
/// assert_eq!(amounts, vec![34, 33, 33]);
/// ```
pub fn allocate_charge(
    charge: Charge,
    amount: Cents,
    participants: &[Participant],
    strategy: Strategy,
    step_number: u32,
) -> Option<ChargeAllocationResult> {
    if amount <= 0 {
        return None;
    }

    let total_weight: i128 = participants.iter().map(|p| i128::from(p.weight)).sum();

    let (shares, reasoning) = if participants.is_empty() || total_weight <= 0 {
        (
            Vec::new(),
            format!("No member has items; {} of {} left unallocated", amount, charge),
        )
    } else {
        match strategy {
            Strategy::Proportional => allocate_proportional(amount, participants, total_weight),
            Strategy::Equal => allocate_equal(amount, participants),
        }
    };

    let allocated: Cents = shares.iter().map(|s| s.amount).sum();
    let unallocated = amount - allocated;

    let audit_step = AuditStep {
        step_number,
        rule_id: format!("{}_allocation", charge),
        rule_name: match charge {
            Charge::Tax => "Tax Allocation".to_string(),
            Charge::Tip => "Tip Allocation".to_string(),
        },
        subject: charge.to_string(),
        input: json!({
            "amount": amount,
            "strategy": strategy.as_str(),
            "participants": participants
                .iter()
                .map(|p| json!({ "member_id": p.member_id, "weight": p.weight }))
                .collect::<Vec<_>>(),
        }),
        output: json!({
            "shares": shares
                .iter()
                .map(|s| json!({ "member_id": s.member_id, "amount": s.amount }))
                .collect::<Vec<_>>(),
            "unallocated": unallocated,
        }),
        reasoning,
    };

    Some(ChargeAllocationResult {
        shares,
        unallocated,
        audit_step,
    })
}

fn allocate_proportional(
    amount: Cents,
    participants: &[Participant],
    total_weight: i128,
) -> (Vec<MemberShare>, String) {
    let mut shares = Vec::with_capacity(participants.len());
    let mut allocated: Cents = 0;
    let last = participants.len() - 1;

    for (i, p) in participants.iter().enumerate() {
        let share = if i == last {
            amount - allocated
        } else {
            let share = rounded_share(amount, i128::from(p.weight), total_weight);
            allocated += share;
            share
        };
        shares.push(MemberShare {
            member_id: p.member_id.clone(),
            amount: share,
        });
    }

    let reasoning = format!(
        "Proportional split of {} over items total {}; {} receives the remainder",
        amount, total_weight, participants[last].member_id
    );
    (shares, reasoning)
}

fn allocate_equal(amount: Cents, participants: &[Participant]) -> (Vec<MemberShare>, String) {
    let parts = split_evenly(amount, participants.len());
    let extra = parts.iter().filter(|part| **part > parts[parts.len() - 1]).count();

    let shares = participants
        .iter()
        .zip(parts)
        .map(|(p, part)| MemberShare {
            member_id: p.member_id.clone(),
            amount: part,
        })
        .collect();

    let reasoning = format!(
        "Equal split of {} among {} members; first {} receive one extra unit",
        amount,
        participants.len(),
        extra
    );
    (shares, reasoning)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participants(weights: &[(&str, Cents)]) -> Vec<Participant> {
        weights
            .iter()
            .map(|(id, weight)| Participant {
                member_id: id.to_string(),
                weight: *weight,
            })
            .collect()
    }

    fn amounts(result: &ChargeAllocationResult) -> Vec<Cents> {
        result.shares.iter().map(|s| s.amount).collect()
    }

    #[test]
    fn test_zero_amount_is_skipped() {
        let ps = participants(&[("a", 100)]);
        assert!(allocate_charge(Charge::Tax, 0, &ps, Strategy::Proportional, 1).is_none());
    }

    #[test]
    fn test_negative_amount_is_skipped() {
        let ps = participants(&[("a", 100)]);
        assert!(allocate_charge(Charge::Tip, -5, &ps, Strategy::Equal, 1).is_none());
    }

    #[test]
    fn test_proportional_exact_split() {
        let ps = participants(&[("a", 1800), ("b", 867), ("c", 1133)]);
        let result = allocate_charge(Charge::Tax, 380, &ps, Strategy::Proportional, 1).unwrap();

        // 380 * 1800 / 3800 = 180, 380 * 867 / 3800 = 86.7 -> 87, c gets 113
        assert_eq!(amounts(&result), vec![180, 87, 113]);
        assert_eq!(result.unallocated, 0);
    }

    #[test]
    fn test_proportional_last_absorbs_rounding() {
        let ps = participants(&[("a", 1), ("b", 1), ("c", 1)]);
        let result = allocate_charge(Charge::Tax, 100, &ps, Strategy::Proportional, 1).unwrap();

        assert_eq!(amounts(&result), vec![33, 33, 34]);
    }

    #[test]
    fn test_proportional_single_participant_takes_all() {
        let ps = participants(&[("a", 42)]);
        let result = allocate_charge(Charge::Tip, 777, &ps, Strategy::Proportional, 1).unwrap();

        assert_eq!(amounts(&result), vec![777]);
    }

    #[test]
    fn test_equal_first_participants_get_extra_unit() {
        let ps = participants(&[("a", 10), ("b", 5000), ("c", 1)]);
        let result = allocate_charge(Charge::Tip, 100, &ps, Strategy::Equal, 1).unwrap();

        assert_eq!(amounts(&result), vec![34, 33, 33]);
        assert!(result.audit_step.reasoning.contains("first 1 receive"));
    }

    #[test]
    fn test_equal_ignores_weights() {
        let ps = participants(&[("a", 1), ("b", 999)]);
        let result = allocate_charge(Charge::Tax, 50, &ps, Strategy::Equal, 1).unwrap();

        assert_eq!(amounts(&result), vec![25, 25]);
    }

    #[test]
    fn test_no_participants_leaves_amount_unallocated() {
        let result = allocate_charge(Charge::Tax, 250, &[], Strategy::Proportional, 1).unwrap();

        assert!(result.shares.is_empty());
        assert_eq!(result.unallocated, 250);
        assert!(result.audit_step.reasoning.contains("unallocated"));
    }

    #[test]
    fn test_audit_step_identifies_charge() {
        let ps = participants(&[("a", 100)]);
        let result = allocate_charge(Charge::Tip, 15, &ps, Strategy::Equal, 7).unwrap();

        assert_eq!(result.audit_step.step_number, 7);
        assert_eq!(result.audit_step.rule_id, "tip_allocation");
        assert_eq!(result.audit_step.subject, "tip");
        assert_eq!(result.audit_step.input["strategy"], "EQUAL");
        assert_eq!(result.audit_step.output["unallocated"], 0);
    }
}
