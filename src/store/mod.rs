//! Receipt storage.
//!
//! The settlement engine reads plain data and hands back plain rows; this
//! module is the collaborator that holds receipts, their assignments and
//! their stored settlements. Replace-all writes are atomic: a reader sees
//! either the previous set of rows or the new one, never a mix.

mod memory;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SettleResult;
use crate::models::{
    Assignment, Cents, Member, Receipt, ReceiptLineItem, SettlementRecord, SettlementRow,
    Strategy,
};

pub use memory::InMemoryStore;

/// Partial update of a receipt's editable fields. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptUpdate {
    /// New merchant name.
    #[serde(default)]
    pub merchant_name: Option<String>,
    /// New receipt date.
    #[serde(default)]
    pub receipt_date: Option<NaiveDate>,
    /// New payer.
    #[serde(default)]
    pub payer_id: Option<String>,
    /// New tax amount.
    #[serde(default)]
    pub tax: Option<Cents>,
    /// New tip amount.
    #[serde(default)]
    pub tip: Option<Cents>,
    /// New receipt total.
    #[serde(default)]
    pub total: Option<Cents>,
    /// New tax strategy.
    #[serde(default)]
    pub tax_strategy: Option<Strategy>,
    /// New tip strategy.
    #[serde(default)]
    pub tip_strategy: Option<Strategy>,
}

impl ReceiptUpdate {
    /// Applies the present fields to `receipt`.
    pub fn apply_to(self, receipt: &mut Receipt) {
        if let Some(merchant_name) = self.merchant_name {
            receipt.merchant_name = Some(merchant_name);
        }
        if let Some(receipt_date) = self.receipt_date {
            receipt.receipt_date = Some(receipt_date);
        }
        if let Some(payer_id) = self.payer_id {
            receipt.payer_id = Some(payer_id);
        }
        if let Some(tax) = self.tax {
            receipt.tax = tax;
        }
        if let Some(tip) = self.tip {
            receipt.tip = tip;
        }
        if let Some(total) = self.total {
            receipt.total = Some(total);
        }
        if let Some(tax_strategy) = self.tax_strategy {
            receipt.tax_strategy = tax_strategy;
        }
        if let Some(tip_strategy) = self.tip_strategy {
            receipt.tip_strategy = tip_strategy;
        }
    }
}

/// Partial update of a line item. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemUpdate {
    /// New description.
    #[serde(default)]
    pub name: Option<String>,
    /// New line total.
    #[serde(default)]
    pub line_total: Option<Cents>,
    /// Include or exclude the line from settlement.
    #[serde(default)]
    pub is_valid: Option<bool>,
}

impl LineItemUpdate {
    /// Applies the present fields to `item`.
    pub fn apply_to(self, item: &mut ReceiptLineItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(line_total) = self.line_total {
            item.line_total = line_total;
        }
        if let Some(is_valid) = self.is_valid {
            item.is_valid = is_valid;
        }
    }
}

/// A line item to add to a receipt, before it has a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    /// Identifier; generated from the item's position when omitted.
    #[serde(default)]
    pub id: Option<String>,
    /// Description printed on the receipt.
    pub name: String,
    /// Quantity purchased.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Total for the line in minor units.
    pub line_total: Cents,
    /// Whether the line counts towards settlement.
    #[serde(default = "default_is_valid")]
    pub is_valid: bool,
}

fn default_quantity() -> u32 {
    1
}

fn default_is_valid() -> bool {
    true
}

impl NewLineItem {
    /// Places the item at `sort_order`, using `fallback_id` when no id was
    /// given.
    pub fn into_line_item(self, fallback_id: String, sort_order: u32) -> ReceiptLineItem {
        ReceiptLineItem {
            id: self.id.unwrap_or(fallback_id),
            name: self.name,
            quantity: self.quantity,
            line_total: self.line_total,
            is_valid: self.is_valid,
            sort_order,
        }
    }
}

/// Partial update of a group member. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberUpdate {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Account id in the external ledger.
    #[serde(default)]
    pub ledger_user_id: Option<u64>,
}

impl MemberUpdate {
    /// Applies the present fields to `member`.
    pub fn apply_to(self, member: &mut Member) {
        if let Some(name) = self.name {
            member.name = name;
        }
        if let Some(ledger_user_id) = self.ledger_user_id {
            member.ledger_user_id = Some(ledger_user_id);
        }
    }
}

/// Storage for receipts, assignments and settlement records.
pub trait ReceiptStore: Send + Sync {
    /// Stores a new receipt.
    fn insert_receipt(&self, receipt: Receipt) -> SettleResult<Receipt>;

    /// Fetches a receipt by id.
    fn receipt(&self, id: &str) -> SettleResult<Receipt>;

    /// Applies a partial update to a receipt and returns the result.
    fn update_receipt(&self, id: &str, update: ReceiptUpdate) -> SettleResult<Receipt>;

    /// Applies a partial update to one line item and returns the result.
    fn update_line_item(
        &self,
        receipt_id: &str,
        item_id: &str,
        update: LineItemUpdate,
    ) -> SettleResult<ReceiptLineItem>;

    /// Appends a line item after the receipt's last one and returns it.
    ///
    /// The item's `sort_order` is reassigned to the next free position at
    /// write time. Fails with `InvalidLineItem` if the id is already taken.
    fn add_line_item(
        &self,
        receipt_id: &str,
        item: ReceiptLineItem,
    ) -> SettleResult<ReceiptLineItem>;

    /// Removes a line item and returns it.
    ///
    /// Assignments that reference the item are kept; they contribute
    /// nothing until replaced.
    fn delete_line_item(&self, receipt_id: &str, item_id: &str) -> SettleResult<ReceiptLineItem>;

    /// Applies a partial update to one group member and returns the result.
    fn update_member(
        &self,
        receipt_id: &str,
        member_id: &str,
        update: MemberUpdate,
    ) -> SettleResult<Member>;

    /// Returns a receipt's assignments in the order they were stored.
    fn assignments(&self, receipt_id: &str) -> SettleResult<Vec<Assignment>>;

    /// Replaces all of a receipt's assignments and marks it as splitting.
    fn replace_assignments(
        &self,
        receipt_id: &str,
        assignments: Vec<Assignment>,
    ) -> SettleResult<Vec<Assignment>>;

    /// Returns a receipt's stored settlement records.
    fn settlements(&self, receipt_id: &str) -> SettleResult<Vec<SettlementRecord>>;

    /// Replaces all of a receipt's settlement records with freshly stamped
    /// ones and marks it as settled, in one atomic unit.
    fn replace_settlements(
        &self,
        receipt_id: &str,
        rows: Vec<SettlementRow>,
    ) -> SettleResult<Vec<SettlementRecord>>;
}
