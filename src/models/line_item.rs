//! Line item models.
//!
//! [`LineItem`] is the minimal shape the allocation engine reads, while
//! [`ReceiptLineItem`] is the stored record with display and validity data.

use serde::{Deserialize, Serialize};

use super::Cents;

/// A line item as seen by the allocation engine.
///
/// # Example
///
/// ```
/// use receipt_split::models::LineItem;
///
/// let item = LineItem::new("item_1", 1800);
/// assert_eq!(item.line_total, 1800);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Identifier, unique within a receipt.
    pub id: String,
    /// Total for the line in minor units. Expected to be non-negative.
    pub line_total: Cents,
}

impl LineItem {
    /// Creates a new line item.
    pub fn new(id: impl Into<String>, line_total: Cents) -> Self {
        Self {
            id: id.into(),
            line_total,
        }
    }
}

/// A line item as stored on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLineItem {
    /// Identifier, unique within a receipt.
    pub id: String,
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
    /// Display position on the receipt.
    #[serde(default)]
    pub sort_order: u32,
}

fn default_quantity() -> u32 {
    1
}

fn default_is_valid() -> bool {
    true
}

impl ReceiptLineItem {
    /// Projects the stored record onto the engine's input shape.
    pub fn to_line_item(&self) -> LineItem {
        LineItem::new(self.id.clone(), self.line_total)
    }
}
