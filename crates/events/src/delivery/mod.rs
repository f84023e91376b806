//! Outbound delivery channels for workflow notifications.

pub mod email;
