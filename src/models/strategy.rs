//! Allocation strategies and assignment encodings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a receipt-level charge (tax or tip) is divided among participants.
///
/// # Example
///
/// ```
/// use receipt_split::models::Strategy;
///
/// let strategy: Strategy = serde_json::from_str("\"EQUAL\"").unwrap();
/// assert_eq!(strategy, Strategy::Equal);
/// assert_eq!(Strategy::default(), Strategy::Proportional);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Weighted by each participant's items total.
    #[default]
    Proportional,
    /// Divided evenly, extra units going to the earliest participants.
    Equal,
}

impl Strategy {
    /// Returns the wire name of the strategy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Proportional => "PROPORTIONAL",
            Strategy::Equal => "EQUAL",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The interpretation inferred for one line item's assignment rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMode {
    /// Numerators are relative weights among co-assignees.
    Ratio,
    /// Numerators are exact amounts owed in minor units.
    Manual,
}

impl AllocationMode {
    /// Returns the wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationMode::Ratio => "ratio",
            AllocationMode::Manual => "manual",
        }
    }
}
