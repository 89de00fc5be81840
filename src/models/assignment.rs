//! Item assignment model and encoding helpers.
//!
//! An [`Assignment`] links a line item to a member through a
//! numerator/denominator pair. The pair has two encodings that share the
//! same shape:
//!
//! - ratio: the numerator is a relative weight and the denominator is the
//!   sum of weights for the item (informational only);
//! - manual: the numerator is an exact amount in minor units and the
//!   denominator equals the item's line total on every row.
//!
//! No mode tag is stored. The engine infers the mode per line item, so the
//! helpers here are the only sanctioned way to produce either encoding.

use serde::{Deserialize, Serialize};

use crate::error::{SettleError, SettleResult};

use super::{Cents, LineItem};

/// A record assigning (part of) a line item to a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// The line item being assigned.
    pub line_item_id: String,
    /// The member receiving the share.
    pub member_id: String,
    /// Weight (ratio mode) or exact amount (manual mode).
    pub share_numerator: i64,
    /// Weight sum (ratio mode) or line total (manual mode).
    pub share_denominator: i64,
}

impl Assignment {
    /// Creates an assignment from its raw parts.
    pub fn new(
        line_item_id: impl Into<String>,
        member_id: impl Into<String>,
        share_numerator: i64,
        share_denominator: i64,
    ) -> Self {
        Self {
            line_item_id: line_item_id.into(),
            member_id: member_id.into(),
            share_numerator,
            share_denominator,
        }
    }

    /// Splits a line item evenly: weight 1 per member, denominator = member count.
    ///
    /// # Example
    ///
    /// ```
    /// use receipt_split::models::Assignment;
    ///
    /// let rows = Assignment::equal_split("item_1", &["a", "b", "c"]);
    /// assert_eq!(rows.len(), 3);
    /// assert!(rows.iter().all(|r| r.share_numerator == 1 && r.share_denominator == 3));
    /// ```
    pub fn equal_split<S: AsRef<str>>(line_item_id: &str, member_ids: &[S]) -> Vec<Assignment> {
        let denominator = member_ids.len() as i64;
        member_ids
            .iter()
            .map(|member_id| Assignment::new(line_item_id, member_id.as_ref(), 1, denominator))
            .collect()
    }

    /// Splits a line item by relative weights.
    ///
    /// Each row's denominator is the sum of all weights. Weights below 1
    /// are rejected.
    pub fn ratio_split(
        line_item_id: &str,
        weights: &[(&str, i64)],
    ) -> SettleResult<Vec<Assignment>> {
        if let Some((member_id, weight)) = weights.iter().find(|(_, weight)| *weight < 1) {
            return Err(SettleError::InvalidAssignment {
                line_item_id: line_item_id.to_string(),
                member_id: member_id.to_string(),
                message: format!("weight must be at least 1, got {}", weight),
            });
        }

        let denominator: i64 = weights.iter().map(|(_, weight)| weight).sum();
        Ok(weights
            .iter()
            .map(|(member_id, weight)| Assignment::new(line_item_id, *member_id, *weight, denominator))
            .collect())
    }

    /// Splits a line item by exact amounts.
    ///
    /// Every row's denominator is the item's line total, and the amounts
    /// must add up to exactly that total.
    ///
    /// # Example
    ///
    /// ```
    /// use receipt_split::models::{Assignment, LineItem};
    ///
    /// let item = LineItem::new("item_1", 999);
    /// let rows = Assignment::manual_split(&item, &[("a", 500), ("b", 499)]).unwrap();
    /// assert_eq!(rows[0].share_denominator, 999);
    ///
    /// assert!(Assignment::manual_split(&item, &[("a", 500), ("b", 500)]).is_err());
    /// ```
    pub fn manual_split(item: &LineItem, amounts: &[(&str, Cents)]) -> SettleResult<Vec<Assignment>> {
        if let Some((member_id, amount)) = amounts.iter().find(|(_, amount)| *amount < 1) {
            return Err(SettleError::InvalidAssignment {
                line_item_id: item.id.clone(),
                member_id: member_id.to_string(),
                message: format!("amount must be at least 1, got {}", amount),
            });
        }

        let actual: Cents = amounts.iter().map(|(_, amount)| amount).sum();
        if actual != item.line_total {
            return Err(SettleError::ManualSplitMismatch {
                line_item_id: item.id.clone(),
                expected: item.line_total,
                actual,
            });
        }

        Ok(amounts
            .iter()
            .map(|(member_id, amount)| Assignment::new(item.id.as_str(), *member_id, *amount, item.line_total))
            .collect())
    }
}
