//! Domain rules for the staff purchase-request workflow.
//!
//! This crate has zero internal dependencies so the store, event and HTTP
//! layers can all share the same state machine, token, role and reminder
//! rules.

pub mod error;
pub mod lifecycle;
pub mod purchase_request;
pub mod reminder;
pub mod roles;
pub mod token;
pub mod types;
