//! Receipt editing and settlement workflows.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::allocation::compute_settlement_breakdown;
use crate::error::{SettleError, SettleResult};
use crate::models::{
    Assignment, Cents, LineItem, Member, Receipt, ReceiptLineItem, SettlementBreakdown,
    SettlementRecord, Strategy,
};
use crate::store::{LineItemUpdate, MemberUpdate, NewLineItem, ReceiptStore, ReceiptUpdate};

use super::validation::{check_member, validate_assignments, validate_receipt};

/// Everything the engine needs for one receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementInput {
    /// Valid line items in display order.
    pub line_items: Vec<LineItem>,
    /// Assignments in stored order.
    pub assignments: Vec<Assignment>,
    /// Tax in minor units.
    pub tax: Cents,
    /// Tip in minor units.
    pub tip: Cents,
    /// How tax is divided.
    pub tax_strategy: Strategy,
    /// How tip is divided.
    pub tip_strategy: Strategy,
}

impl SettlementInput {
    /// Runs the engine over this input.
    pub fn compute(&self) -> SettlementBreakdown {
        compute_settlement_breakdown(
            &self.line_items,
            &self.assignments,
            self.tax,
            self.tip,
            self.tax_strategy,
            self.tip_strategy,
        )
    }
}

/// Assembles engine input from a stored receipt and its assignments.
///
/// Invalid line items are dropped here; the engine has no notion of
/// validity. Assignments to dropped items are passed through and end up
/// contributing nothing.
pub fn assemble_input(receipt: &Receipt, assignments: Vec<Assignment>) -> SettlementInput {
    SettlementInput {
        line_items: receipt.valid_line_items(),
        assignments,
        tax: receipt.tax,
        tip: receipt.tip,
        tax_strategy: receipt.tax_strategy,
        tip_strategy: receipt.tip_strategy,
    }
}

/// Validates and stores a new receipt.
pub fn create_receipt(store: &dyn ReceiptStore, receipt: Receipt) -> SettleResult<Receipt> {
    validate_receipt(&receipt)?;
    let receipt = store.insert_receipt(receipt)?;
    info!(
        receipt_id = %receipt.id,
        members = receipt.members.len(),
        line_items = receipt.line_items.len(),
        "Receipt created"
    );
    Ok(receipt)
}

/// Validates and applies a partial receipt update.
///
/// The update is applied to a copy of the stored receipt first, and the
/// copy must pass [`validate_receipt`] before anything is written.
pub fn update_receipt(
    store: &dyn ReceiptStore,
    receipt_id: &str,
    update: ReceiptUpdate,
) -> SettleResult<Receipt> {
    let mut candidate = store.receipt(receipt_id)?;
    update.clone().apply_to(&mut candidate);
    validate_receipt(&candidate)?;

    store.update_receipt(receipt_id, update)
}

/// Validates and applies a partial line item update.
pub fn update_line_item(
    store: &dyn ReceiptStore,
    receipt_id: &str,
    item_id: &str,
    update: LineItemUpdate,
) -> SettleResult<ReceiptLineItem> {
    let mut candidate = store.receipt(receipt_id)?;
    let item = candidate
        .line_items
        .iter_mut()
        .find(|item| item.id == item_id)
        .ok_or_else(|| SettleError::LineItemNotFound {
            receipt_id: receipt_id.to_string(),
            item_id: item_id.to_string(),
        })?;
    update.clone().apply_to(item);
    validate_receipt(&candidate)?;

    store.update_line_item(receipt_id, item_id, update)
}

/// Validates and appends a line item after the receipt's last one.
///
/// An item without an id is named after its position, `item_<n>`.
pub fn add_line_item(
    store: &dyn ReceiptStore,
    receipt_id: &str,
    new_item: NewLineItem,
) -> SettleResult<ReceiptLineItem> {
    let mut candidate = store.receipt(receipt_id)?;
    let sort_order = candidate.next_sort_order();
    let item = new_item.into_line_item(format!("item_{}", sort_order + 1), sort_order);
    candidate.line_items.push(item.clone());
    validate_receipt(&candidate)?;

    let item = store.add_line_item(receipt_id, item)?;
    info!(
        receipt_id = %receipt_id,
        item_id = %item.id,
        line_total = item.line_total,
        sort_order = item.sort_order,
        "Line item added"
    );
    Ok(item)
}

/// Deletes a line item, leaving its assignments in place.
///
/// Those assignments no longer match an item, so they contribute nothing
/// and the next preview or settlement reports them as unmatched.
pub fn delete_line_item(
    store: &dyn ReceiptStore,
    receipt_id: &str,
    item_id: &str,
) -> SettleResult<ReceiptLineItem> {
    let item = store.delete_line_item(receipt_id, item_id)?;
    let dangling = store
        .assignments(receipt_id)?
        .iter()
        .filter(|a| a.line_item_id == item_id)
        .count();
    info!(
        receipt_id = %receipt_id,
        item_id = %item_id,
        dangling_assignments = dangling,
        "Line item deleted"
    );
    Ok(item)
}

/// Validates and applies a partial member update, such as mapping the
/// member to a ledger account.
pub fn update_member(
    store: &dyn ReceiptStore,
    receipt_id: &str,
    member_id: &str,
    update: MemberUpdate,
) -> SettleResult<Member> {
    let receipt = store.receipt(receipt_id)?;
    let mut candidate = receipt
        .member(member_id)
        .cloned()
        .ok_or_else(|| SettleError::UnknownMember {
            member_id: member_id.to_string(),
        })?;
    update.clone().apply_to(&mut candidate);
    check_member(&candidate)?;

    let member = store.update_member(receipt_id, member_id, update)?;
    info!(
        receipt_id = %receipt_id,
        member_id = %member_id,
        mapped = member.ledger_user_id.is_some(),
        "Member updated"
    );
    Ok(member)
}

/// Validates and replaces all of a receipt's assignments.
pub fn replace_assignments(
    store: &dyn ReceiptStore,
    receipt_id: &str,
    assignments: Vec<Assignment>,
) -> SettleResult<Vec<Assignment>> {
    let receipt = store.receipt(receipt_id)?;
    validate_assignments(&receipt, &assignments)?;

    let saved = store.replace_assignments(receipt_id, assignments)?;
    info!(
        receipt_id = %receipt_id,
        assignments = saved.len(),
        "Assignments replaced"
    );
    Ok(saved)
}

/// Computes a receipt's settlement from stored data without writing it.
///
/// Uses exactly the same input assembly and engine as [`settle_receipt`],
/// so a preview always matches what settling would store.
pub fn preview_receipt(
    store: &dyn ReceiptStore,
    receipt_id: &str,
) -> SettleResult<SettlementBreakdown> {
    let receipt = store.receipt(receipt_id)?;
    let assignments = store.assignments(receipt_id)?;
    Ok(assemble_input(&receipt, assignments).compute())
}

/// Settles a receipt: checks preconditions, computes rows, and replaces the
/// stored settlement records atomically, marking the receipt settled.
///
/// Fails with `NoPayer` when no payer is set, `NoValidLineItems` when every
/// line item is excluded, and `NoAssignments` when nothing is assigned.
///
/// The receipt and its assignments are read before `replace_settlements`
/// takes the store's write lock. An edit that lands in between is not seen
/// here, and the rows written reflect the earlier read; settle again after
/// concurrent edits.
pub fn settle_receipt(
    store: &dyn ReceiptStore,
    receipt_id: &str,
) -> SettleResult<Vec<SettlementRecord>> {
    let receipt = store.receipt(receipt_id)?;

    if receipt.payer_id.is_none() {
        warn!(receipt_id = %receipt_id, "Settle rejected: no payer");
        return Err(SettleError::NoPayer);
    }

    let assignments = store.assignments(receipt_id)?;
    let input = assemble_input(&receipt, assignments);

    if input.line_items.is_empty() {
        warn!(receipt_id = %receipt_id, "Settle rejected: no valid line items");
        return Err(SettleError::NoValidLineItems);
    }
    if input.assignments.is_empty() {
        warn!(receipt_id = %receipt_id, "Settle rejected: no assignments");
        return Err(SettleError::NoAssignments);
    }

    let start_time = Instant::now();
    let breakdown = input.compute();
    for warning in &breakdown.audit.warnings {
        warn!(
            receipt_id = %receipt_id,
            code = %warning.code,
            "{}", warning.message
        );
    }
    debug!(
        receipt_id = %receipt_id,
        steps = breakdown.audit.steps.len(),
        "Settlement computed"
    );

    let records = store.replace_settlements(receipt_id, breakdown.rows)?;
    info!(
        receipt_id = %receipt_id,
        members = records.len(),
        items_total = breakdown.totals.items_total,
        grand_total = breakdown.totals.grand_total,
        duration_us = start_time.elapsed().as_micros(),
        "Receipt settled"
    );
    Ok(records)
}
