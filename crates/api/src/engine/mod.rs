//! Workflow engines.
//!
//! Thin, per-request views over the stores that own the business rules:
//! [`lifecycle::RequestLifecycle`] for purchase requests and
//! [`admission::StaffAdmission`] for staff accounts. Both publish workflow
//! events after their writes commit.

pub mod admission;
pub mod lifecycle;
