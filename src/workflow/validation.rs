//! Input validation for receipts and assignments.
//!
//! Everything the engine relies on is checked here: amounts are
//! non-negative and, taken together, within [`MAX_RECEIPT_AMOUNT`], and
//! share terms are positive. Inside those bounds every sum the engine forms
//! fits in `i64`.

use std::collections::HashSet;

use crate::error::{SettleError, SettleResult};
use crate::models::{Assignment, Cents, LineItem, MAX_RECEIPT_AMOUNT, Member, Receipt};

use super::settle::SettlementInput;

pub(crate) fn check_amount(field: &str, amount: Cents) -> SettleResult<()> {
    if amount < 0 {
        return Err(SettleError::InvalidAmount {
            field: field.to_string(),
            message: format!("must not be negative, got {}", amount),
        });
    }
    if amount > MAX_RECEIPT_AMOUNT {
        return Err(SettleError::InvalidAmount {
            field: field.to_string(),
            message: format!("must not exceed {}, got {}", MAX_RECEIPT_AMOUNT, amount),
        });
    }
    Ok(())
}

pub(crate) fn check_line_total(item_id: &str, line_total: Cents) -> SettleResult<()> {
    if line_total < 0 {
        return Err(SettleError::InvalidLineItem {
            item_id: item_id.to_string(),
            message: format!("line total must not be negative, got {}", line_total),
        });
    }
    if line_total > MAX_RECEIPT_AMOUNT {
        return Err(SettleError::InvalidLineItem {
            item_id: item_id.to_string(),
            message: format!(
                "line total must not exceed {}, got {}",
                MAX_RECEIPT_AMOUNT, line_total
            ),
        });
    }
    Ok(())
}

/// Line totals plus tax and tip, summed in `i128` so the check itself
/// cannot overflow.
fn check_combined<'a>(
    line_totals: impl Iterator<Item = &'a Cents>,
    tax: Cents,
    tip: Cents,
) -> SettleResult<()> {
    let combined: i128 = line_totals.map(|&t| i128::from(t)).sum::<i128>()
        + i128::from(tax)
        + i128::from(tip);
    if combined > i128::from(MAX_RECEIPT_AMOUNT) {
        return Err(SettleError::InvalidAmount {
            field: "receipt".to_string(),
            message: format!(
                "line totals, tax and tip add up to {}, above the limit of {}",
                combined, MAX_RECEIPT_AMOUNT
            ),
        });
    }
    Ok(())
}

fn check_share_terms(a: &Assignment) -> SettleResult<()> {
    let invalid = |message: String| SettleError::InvalidAssignment {
        line_item_id: a.line_item_id.clone(),
        member_id: a.member_id.clone(),
        message,
    };

    if a.share_numerator < 1 {
        return Err(invalid(format!(
            "share numerator must be at least 1, got {}",
            a.share_numerator
        )));
    }
    if a.share_denominator < 1 {
        return Err(invalid(format!(
            "share denominator must be at least 1, got {}",
            a.share_denominator
        )));
    }
    Ok(())
}

pub(crate) fn check_payer(receipt: &Receipt, payer_id: &str) -> SettleResult<()> {
    if receipt.member(payer_id).is_none() {
        return Err(SettleError::UnknownMember {
            member_id: payer_id.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn check_member(member: &Member) -> SettleResult<()> {
    if member.name.trim().is_empty() {
        return Err(SettleError::InvalidMember {
            member_id: member.id.clone(),
            message: "name must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Validates a receipt before it is stored or after an edit.
///
/// Checks that every amount is non-negative, line totals plus tax and tip
/// stay within [`MAX_RECEIPT_AMOUNT`], line item ids are unique, and the
/// payer (when set) is one of the receipt's members.
pub fn validate_receipt(receipt: &Receipt) -> SettleResult<()> {
    check_amount("tax", receipt.tax)?;
    check_amount("tip", receipt.tip)?;
    if let Some(total) = receipt.total {
        check_amount("total", total)?;
    }

    let mut seen = HashSet::new();
    for item in &receipt.line_items {
        check_line_total(&item.id, item.line_total)?;
        if !seen.insert(item.id.as_str()) {
            return Err(SettleError::InvalidLineItem {
                item_id: item.id.clone(),
                message: "duplicate line item id".to_string(),
            });
        }
    }
    check_combined(
        receipt.line_items.iter().map(|item| &item.line_total),
        receipt.tax,
        receipt.tip,
    )?;

    if let Some(payer_id) = &receipt.payer_id {
        check_payer(receipt, payer_id)?;
    }
    Ok(())
}

/// Validates a full replacement set of assignments for a receipt.
///
/// Every row must have a numerator and denominator of at least 1, reference
/// a line item on the receipt and a member of its group, and no
/// (line item, member) pair may appear twice.
pub fn validate_assignments(receipt: &Receipt, assignments: &[Assignment]) -> SettleResult<()> {
    let mut seen = HashSet::new();

    for a in assignments {
        check_share_terms(a)?;

        let invalid = |message: &str| SettleError::InvalidAssignment {
            line_item_id: a.line_item_id.clone(),
            member_id: a.member_id.clone(),
            message: message.to_string(),
        };
        if receipt.line_item(&a.line_item_id).is_none() {
            return Err(invalid("line item is not on this receipt"));
        }
        if receipt.member(&a.member_id).is_none() {
            return Err(SettleError::UnknownMember {
                member_id: a.member_id.clone(),
            });
        }
        if !seen.insert((a.line_item_id.as_str(), a.member_id.as_str())) {
            return Err(invalid("member is assigned to this line item twice"));
        }
    }
    Ok(())
}

/// Validates ad-hoc engine input that did not come from a stored receipt.
///
/// Applies the same amount bounds as [`validate_receipt`] and the same share
/// term rules as [`validate_assignments`]. Assignments may still reference
/// line items that were not supplied; the engine reports those itself.
pub fn validate_input(input: &SettlementInput) -> SettleResult<()> {
    check_amount("tax", input.tax)?;
    check_amount("tip", input.tip)?;
    for item in &input.line_items {
        check_line_total(&item.id, item.line_total)?;
    }
    check_combined(
        input.line_items.iter().map(|item: &LineItem| &item.line_total),
        input.tax,
        input.tip,
    )?;

    for a in &input.assignments {
        check_share_terms(a)?;
    }
    Ok(())
}
