//! Receipt splitting and settlement for shared group expenses.
//!
//! This crate divides a receipt's line items, tax and tip among the members
//! of a group, producing per-member amounts that always sum exactly to the
//! inputs. Around that core sit a receipt store, the settle workflow, a
//! ledger export builder and an HTTP API.

#![warn(missing_docs)]

pub mod allocation;
pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod store;
pub mod workflow;
