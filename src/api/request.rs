//! Request types for the receipt settlement API.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::StrategyDefaults;
use crate::models::{Assignment, Cents, LineItem, Member, Receipt, ReceiptStatus, Strategy};
use crate::store::NewLineItem;

/// Request body for `POST /settlements/preview`.
///
/// Runs the engine over the supplied data without touching storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRequest {
    /// Line items to allocate.
    pub line_items: Vec<LineItem>,
    /// Assignments of those items to members.
    pub assignments: Vec<Assignment>,
    /// Tax in minor units.
    #[serde(default)]
    pub tax: Cents,
    /// Tip in minor units.
    #[serde(default)]
    pub tip: Cents,
    /// Tax strategy; the configured default when omitted.
    #[serde(default)]
    pub tax_strategy: Option<Strategy>,
    /// Tip strategy; the configured default when omitted.
    #[serde(default)]
    pub tip_strategy: Option<Strategy>,
}

/// Request body for `POST /receipts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReceiptRequest {
    /// Merchant name printed on the receipt.
    #[serde(default)]
    pub merchant_name: Option<String>,
    /// Date printed on the receipt.
    #[serde(default)]
    pub receipt_date: Option<NaiveDate>,
    /// The member who paid.
    #[serde(default)]
    pub payer_id: Option<String>,
    /// The group members sharing the receipt.
    pub members: Vec<Member>,
    /// Line items in display order.
    pub line_items: Vec<NewLineItem>,
    /// Tax in minor units.
    #[serde(default)]
    pub tax: Cents,
    /// Tip in minor units.
    #[serde(default)]
    pub tip: Cents,
    /// Receipt total in minor units.
    #[serde(default)]
    pub total: Option<Cents>,
    /// Tax strategy; the configured default when omitted.
    #[serde(default)]
    pub tax_strategy: Option<Strategy>,
    /// Tip strategy; the configured default when omitted.
    #[serde(default)]
    pub tip_strategy: Option<Strategy>,
}

impl CreateReceiptRequest {
    /// Builds a new receipt with a fresh id, filling omitted strategies
    /// from `defaults`.
    pub fn into_receipt(self, defaults: &StrategyDefaults) -> Receipt {
        let line_items = self
            .line_items
            .into_iter()
            .enumerate()
            .map(|(i, item)| item.into_line_item(format!("item_{}", i + 1), i as u32))
            .collect();

        Receipt {
            id: Uuid::new_v4().to_string(),
            merchant_name: self.merchant_name,
            receipt_date: self.receipt_date,
            payer_id: self.payer_id,
            members: self.members,
            line_items,
            tax: self.tax,
            tip: self.tip,
            total: self.total,
            tax_strategy: self.tax_strategy.unwrap_or(defaults.tax_strategy),
            tip_strategy: self.tip_strategy.unwrap_or(defaults.tip_strategy),
            status: ReceiptStatus::Review,
            created_at: Utc::now(),
        }
    }
}

/// Request body for `PUT /receipts/:id/assignments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentsRequest {
    /// The complete replacement set of assignments.
    pub assignments: Vec<Assignment>,
}
