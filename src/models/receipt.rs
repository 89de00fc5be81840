//! Receipt, member and stored settlement models.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, LineItem, ReceiptLineItem, SettlementRow, Strategy};

/// Lifecycle status of a receipt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptStatus {
    /// Uploaded, not yet processed.
    Pending,
    /// Line items are being extracted.
    Processing,
    /// Line items are awaiting review.
    #[default]
    Review,
    /// Items are being assigned to members.
    Splitting,
    /// Settlement rows have been computed and stored.
    Settled,
    /// The settlement was pushed to the external ledger.
    Exported,
}

impl ReceiptStatus {
    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptStatus::Pending => "PENDING",
            ReceiptStatus::Processing => "PROCESSING",
            ReceiptStatus::Review => "REVIEW",
            ReceiptStatus::Splitting => "SPLITTING",
            ReceiptStatus::Settled => "SETTLED",
            ReceiptStatus::Exported => "EXPORTED",
        }
    }

    /// Returns true once settlement rows exist for the receipt.
    pub fn is_settled(&self) -> bool {
        matches!(self, ReceiptStatus::Settled | ReceiptStatus::Exported)
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A member of the group sharing a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Identifier, unique within the group.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Account id in the external ledger, when the member has been mapped.
    #[serde(default)]
    pub ledger_user_id: Option<u64>,
}

/// A receipt shared by a group of members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique identifier.
    pub id: String,
    /// Merchant name printed on the receipt.
    pub merchant_name: Option<String>,
    /// Date printed on the receipt.
    pub receipt_date: Option<NaiveDate>,
    /// The member who paid the bill.
    pub payer_id: Option<String>,
    /// The members of the group sharing the receipt.
    pub members: Vec<Member>,
    /// Line items, valid or not.
    pub line_items: Vec<ReceiptLineItem>,
    /// Tax in minor units.
    pub tax: Cents,
    /// Tip in minor units.
    pub tip: Cents,
    /// Receipt total in minor units, when known.
    pub total: Option<Cents>,
    /// How tax is divided.
    pub tax_strategy: Strategy,
    /// How tip is divided.
    pub tip_strategy: Strategy,
    /// Lifecycle status.
    pub status: ReceiptStatus,
    /// When the receipt was created.
    pub created_at: DateTime<Utc>,
}

impl Receipt {
    /// Looks up a group member by id.
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Looks up a line item by id.
    pub fn line_item(&self, item_id: &str) -> Option<&ReceiptLineItem> {
        self.line_items.iter().find(|item| item.id == item_id)
    }

    /// The sort order a newly added line item takes: one past the highest.
    pub fn next_sort_order(&self) -> u32 {
        self.line_items
            .iter()
            .map(|item| item.sort_order + 1)
            .max()
            .unwrap_or(0)
    }

    /// Returns the valid line items in display order, projected onto the
    /// engine's input shape.
    pub fn valid_line_items(&self) -> Vec<LineItem> {
        let mut items: Vec<&ReceiptLineItem> =
            self.line_items.iter().filter(|item| item.is_valid).collect();
        items.sort_by_key(|item| item.sort_order);
        items.into_iter().map(ReceiptLineItem::to_line_item).collect()
    }
}

/// A persisted settlement row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    /// Unique identifier of the record.
    pub id: Uuid,
    /// The receipt the record belongs to.
    pub receipt_id: String,
    /// The member the record belongs to.
    pub member_id: String,
    /// Sum of the member's allocated item shares.
    pub items_total: Cents,
    /// The member's share of tax.
    pub tax_share: Cents,
    /// The member's share of tip.
    pub tip_share: Cents,
    /// Total owed by the member.
    pub final_amount: Cents,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}

impl SettlementRecord {
    /// Stamps a computed row with a fresh id and timestamp.
    pub fn from_row(receipt_id: &str, row: SettlementRow, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            receipt_id: receipt_id.to_string(),
            member_id: row.member_id,
            items_total: row.items_total,
            tax_share: row.tax_share,
            tip_share: row.tip_share,
            final_amount: row.final_amount,
            created_at,
        }
    }
}
