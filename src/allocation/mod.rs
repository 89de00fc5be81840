//! The settlement allocation engine.
//!
//! This module turns a receipt's line items, item assignments, tax and tip
//! into a deterministic per-member settlement in integer minor units. It is
//! pure: no I/O, no shared state, no error path. Mode detection, item
//! allocation, tax/tip allocation and the integer division helpers are
//! exposed individually so callers can preview or audit each stage.

mod charge_allocation;
mod engine;
mod item_allocation;
mod mode_detection;
mod rounding;

pub use charge_allocation::{Charge, ChargeAllocationResult, Participant, allocate_charge};
pub use engine::{
    WARNING_UNALLOCATED_CHARGE, WARNING_UNMATCHED_ASSIGNMENT, WARNING_ZERO_WEIGHT_ITEM,
    compute_settlement_breakdown, compute_settlements,
};
pub use item_allocation::{ItemAllocationResult, MemberShare, allocate_line_item};
pub use mode_detection::detect_mode;
pub use rounding::{floor_share, rounded_share, split_evenly};
