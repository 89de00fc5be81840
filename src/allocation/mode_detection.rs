//! Assignment encoding detection.
//!
//! Ratio and manual assignments share the same numerator/denominator
//! shape, so the encoding of a line item's rows is inferred from their
//! values. The heuristic is ambiguous for adversarial inputs (a ratio split
//! whose weights happen to equal the line total on every row and sum to it
//! reads as manual); that is accepted behaviour, not an error.

use crate::models::{AllocationMode, Assignment, LineItem};

/// Detects the assignment encoding used for one line item.
///
/// Fewer than two rows always read as ratio, since a sole assignee gets the
/// whole item under either encoding. Otherwise the rows are manual only when
/// every denominator equals the line total and the numerators sum to it.
///
/// # Examples
///
/// ```
/// use receipt_split::allocation::detect_mode;
/// use receipt_split::models::{AllocationMode, Assignment, LineItem};
///
/// let item = LineItem::new("item_1", 999);
/// let a = Assignment::new("item_1", "a", 500, 999);
/// let b = Assignment::new("item_1", "b", 499, 999);
/// assert_eq!(detect_mode(&item, &[&a, &b]), AllocationMode::Manual);
///
/// let c = Assignment::new("item_1", "a", 1, 2);
/// let d = Assignment::new("item_1", "b", 1, 2);
/// assert_eq!(detect_mode(&item, &[&c, &d]), AllocationMode::Ratio);
/// ```
pub fn detect_mode(item: &LineItem, assignments: &[&Assignment]) -> AllocationMode {
    if assignments.len() < 2 {
        return AllocationMode::Ratio;
    }

    let all_manual = assignments
        .iter()
        .all(|a| a.share_denominator == item.line_total);
    if !all_manual {
        return AllocationMode::Ratio;
    }

    let numerator_sum: i128 = assignments
        .iter()
        .map(|a| i128::from(a.share_numerator))
        .sum();
    if numerator_sum == i128::from(item.line_total) {
        AllocationMode::Manual
    } else {
        AllocationMode::Ratio
    }
}
