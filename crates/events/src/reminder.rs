//! Daily reminder sweep for requests still awaiting a response.
//!
//! [`ReminderScheduler`] sleeps until the configured local hour, emails the
//! designated recipient of every `Pending` request that has not yet been
//! reminded today, and records each successful send. It never changes a
//! request's status.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use serde::Serialize;
use staffpurchase_core::lifecycle::RequestStatus;
use staffpurchase_core::reminder::{next_run_after, reminded_today, REMINDER_LOG_TYPE};
use staffpurchase_core::types::Timestamp;
use staffpurchase_db::models::purchase_request::{EmailLogEntry, PurchaseRequest};
use staffpurchase_db::{PurchaseRequestStore, StoreError};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::delivery::email::Mailer;
use crate::templates::Templates;

/// Counts from one sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub pending: usize,
    pub sent: usize,
    pub skipped_already_reminded: usize,
    pub skipped_no_email: usize,
    /// Answered after the pending query ran.
    pub skipped_answered: usize,
    pub failed: usize,
}

pub struct ReminderScheduler {
    store: Arc<dyn PurchaseRequestStore>,
    mailer: Arc<dyn Mailer>,
    templates: Templates,
    hour: u32,
    /// Serializes the daily run with on-demand sweeps.
    sweep_lock: Mutex<()>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn PurchaseRequestStore>,
        mailer: Arc<dyn Mailer>,
        templates: Templates,
        hour: u32,
    ) -> Self {
        Self {
            store,
            mailer,
            templates,
            hour,
            sweep_lock: Mutex::new(()),
        }
    }

    /// Run the scheduler loop.
    ///
    /// Sleeps until the next `hour:00` server-local time, sweeps, and
    /// repeats. Exits when `cancel` is triggered.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(hour = self.hour, "Reminder scheduler started");

        loop {
            let now = Local::now();
            let next = next_run_after(&now, self.hour);
            let wait = (next.clone() - now).to_std().unwrap_or(Duration::ZERO);
            tracing::debug!(next_run = %next, "Next reminder sweep scheduled");

            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Reminder scheduler cancelled");
                    break;
                }
                _ = tokio::time::sleep(wait) => {
                    if let Err(e) = self.sweep(Utc::now()).await {
                        tracing::error!(error = %e, "Reminder sweep failed");
                    }
                }
            }
        }
    }

    /// Process every pending request once, as of `now`.
    ///
    /// Only the initial query can fail the sweep. Per-request failures are
    /// logged, counted and skipped.
    pub async fn sweep(&self, now: Timestamp) -> Result<SweepReport, StoreError> {
        let _guard = self.sweep_lock.lock().await;

        let pending = self.store.list_pending().await?;
        let mut report = SweepReport {
            pending: pending.len(),
            ..Default::default()
        };

        if pending.is_empty() {
            tracing::info!("No pending requests, nothing to remind");
            return Ok(report);
        }

        for request in &pending {
            if reminded_today(request.last_reminder_sent, now, &Local) {
                report.skipped_already_reminded += 1;
                continue;
            }

            let recipient = request.email.trim();
            if recipient.is_empty() {
                tracing::info!(request_id = request.id, "Skipping reminder: no email on request");
                report.skipped_no_email += 1;
                continue;
            }

            let current = match self.store.find_by_id(request.id).await {
                Ok(Some(current)) if awaits_response(&current) => current,
                Ok(_) => {
                    tracing::debug!(request_id = request.id, "Skipping reminder: request already answered");
                    report.skipped_answered += 1;
                    continue;
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(request_id = request.id, error = %e, "Failed to re-read request");
                    continue;
                }
            };

            match self.remind(&current, recipient, now).await {
                Ok(()) => {
                    report.sent += 1;
                    tracing::info!(request_id = request.id, to = recipient, "Reminder sent");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(request_id = request.id, error = %e, "Failed to send reminder");
                }
            }
        }

        tracing::info!(
            pending = report.pending,
            sent = report.sent,
            skipped_already_reminded = report.skipped_already_reminded,
            skipped_no_email = report.skipped_no_email,
            skipped_answered = report.skipped_answered,
            failed = report.failed,
            "Reminder sweep complete"
        );
        Ok(report)
    }

    async fn remind(
        &self,
        request: &PurchaseRequest,
        recipient: &str,
        now: Timestamp,
    ) -> Result<(), ReminderError> {
        let email = self.templates.reminder(recipient, request);
        self.mailer
            .send(&email)
            .await
            .map_err(|e| ReminderError::Delivery(e.to_string()))?;

        let entry = EmailLogEntry::new(REMINDER_LOG_TYPE, now);
        if self.store.record_reminder(request.id, &entry).await?.is_none() {
            tracing::warn!(request_id = request.id, "Request answered while its reminder was sent, not recorded");
        }
        Ok(())
    }
}

fn awaits_response(request: &PurchaseRequest) -> bool {
    request.status == RequestStatus::Pending && !request.token_used
}

#[derive(Debug, thiserror::Error)]
enum ReminderError {
    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
