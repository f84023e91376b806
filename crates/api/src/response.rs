//! Shared response bodies for API handlers.
//!
//! Collections and records are returned bare. Mutations answer with a
//! `{ "message": ... }` body, optionally with one extra field.

use serde::Serialize;

/// `{ "message": ... }` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Acknowledgement carrying one additional field, flattened next to
/// `message` (e.g. `{ "message": ..., "id": 7 }`).
#[derive(Debug, Serialize)]
pub struct MessageWith<T: Serialize> {
    pub message: String,
    #[serde(flatten)]
    pub extra: T,
}

impl<T: Serialize> MessageWith<T> {
    pub fn new(message: impl Into<String>, extra: T) -> Self {
        Self {
            message: message.into(),
            extra,
        }
    }
}
