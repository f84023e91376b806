//! Fixtures shared by the unit tests in this crate.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use staffpurchase_core::lifecycle::RequestStatus;
use staffpurchase_db::models::purchase_request::PurchaseRequest;

use crate::delivery::email::{EmailError, Mailer};
use crate::templates::RenderedEmail;

pub fn sample_request() -> PurchaseRequest {
    let now = Utc::now();
    PurchaseRequest {
        id: 7,
        store_name: "Hunting <World>".into(),
        employee_name: "Sam \"Sharp\" Carter".into(),
        order_date: now,
        invoice_date: now,
        product_model: "EXPLORER".into(),
        serial_number: String::new(),
        fob: "FOB-1".into(),
        discount: "30%".into(),
        rebate: String::new(),
        email: "sam@store.example".into(),
        public_email: String::new(),
        admin_email: "admin@example.com".into(),
        admin_name: "Staff Member".into(),
        status: RequestStatus::Pending,
        response_token: "abc123".into(),
        token_used: false,
        response_type: None,
        response_note: None,
        response_timestamp: None,
        reminder_count: 0,
        last_reminder_sent: None,
        email_sent_log: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Records every email; fails for recipients listed in `failing`.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<RenderedEmail>>,
    pub failing: HashSet<String>,
}

impl RecordingMailer {
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            sent: Mutex::default(),
            failing: recipients.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<RenderedEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &RenderedEmail) -> Result<(), EmailError> {
        if self.failing.contains(&email.to) {
            return Err(EmailError::Build(format!("refusing to send to {}", email.to)));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
