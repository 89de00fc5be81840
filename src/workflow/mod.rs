//! Receipt workflows around the settlement engine.
//!
//! Validation of everything the engine assumes (bounded non-negative
//! amounts, well-formed assignments, a payer) happens here, before data
//! reaches the store or the engine. Settling assembles the engine input from the store,
//! computes rows, and writes them back in one atomic replace.

mod settle;
mod validation;

pub use settle::{
    SettlementInput, add_line_item, assemble_input, create_receipt, delete_line_item,
    preview_receipt, replace_assignments, settle_receipt, update_line_item, update_member,
    update_receipt,
};
pub use validation::{validate_assignments, validate_input, validate_receipt};
