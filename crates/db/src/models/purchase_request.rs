//! Purchase request entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use staffpurchase_core::lifecycle::{RequestStatus, ResponseAction};
use staffpurchase_core::purchase_request::PurchaseRequestDraft;
use staffpurchase_core::types::{DbId, Timestamp};

/// Full row from the `purchase_requests` table.
///
/// Serialized as-is for the admin dashboard. Public callers only ever see a
/// [`PublicRequestView`].
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub id: DbId,
    pub store_name: String,
    pub employee_name: String,
    pub order_date: Timestamp,
    pub invoice_date: Timestamp,
    pub product_model: String,
    pub serial_number: String,
    pub fob: String,
    pub discount: String,
    pub rebate: String,
    /// Submitter (Sight App) email; empty when not provided.
    pub email: String,
    /// Contact email of whoever filled in the form; empty when not provided.
    pub public_email: String,
    pub admin_email: String,
    pub admin_name: String,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub response_token: String,
    pub token_used: bool,
    pub response_type: Option<String>,
    pub response_note: Option<String>,
    pub response_timestamp: Option<Timestamp>,
    pub reminder_count: i32,
    pub last_reminder_sent: Option<Timestamp>,
    #[sqlx(json)]
    pub email_sent_log: Vec<EmailLogEntry>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One entry of the append-only `emailSentLog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLogEntry {
    pub sent_at: Timestamp,
    #[serde(rename = "type")]
    pub kind: String,
}

impl EmailLogEntry {
    pub fn new(kind: impl Into<String>, sent_at: Timestamp) -> Self {
        Self {
            sent_at,
            kind: kind.into(),
        }
    }
}

/// DTO for inserting a new request. Lifecycle columns take their defaults.
#[derive(Debug, Clone)]
pub struct NewPurchaseRequest {
    pub draft: PurchaseRequestDraft,
    pub admin_email: String,
    pub admin_name: String,
    pub response_token: String,
}

/// Lifecycle columns written when a response token is redeemed.
#[derive(Debug, Clone)]
pub struct ResponseUpdate {
    pub status: RequestStatus,
    pub action: ResponseAction,
    pub note: String,
    pub responded_at: Timestamp,
}

/// Allow-listed projection served on the public token routes.
///
/// Never carries the token itself, the sender identity or the email log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRequestView {
    pub store_name: String,
    pub employee_name: String,
    pub product_model: String,
    pub discount: String,
    pub serial_number: String,
    pub fob: String,
    pub rebate: String,
    pub order_date: Timestamp,
    pub invoice_date: Timestamp,
    pub status: RequestStatus,
    pub token_used: bool,
    pub public_email: String,
}

impl From<&PurchaseRequest> for PublicRequestView {
    fn from(r: &PurchaseRequest) -> Self {
        Self {
            store_name: r.store_name.clone(),
            employee_name: r.employee_name.clone(),
            product_model: r.product_model.clone(),
            discount: r.discount.clone(),
            serial_number: r.serial_number.clone(),
            fob: r.fob.clone(),
            rebate: r.rebate.clone(),
            order_date: r.order_date,
            invoice_date: r.invoice_date,
            status: r.status,
            token_used: r.token_used,
            public_email: r.public_email.clone(),
        }
    }
}

impl PurchaseRequest {
    /// Most recent log entry of the given kind.
    pub fn last_logged(&self, kind: &str) -> Option<&EmailLogEntry> {
        self.email_sent_log.iter().rev().find(|e| e.kind == kind)
    }
}
