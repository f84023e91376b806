//! Maps workflow events to notifications and delivers them.
//!
//! [`NotificationDispatcher`] subscribes to the [`EventBus`](crate::EventBus)
//! and runs as a long-lived background task. Delivery failures are logged
//! and never propagated: by the time an event is published its write has
//! already committed.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bus::{PublishedEvent, WorkflowEvent};
use crate::delivery::email::Mailer;
use crate::templates::{RenderedEmail, Templates};

/// Fixed recipients the dispatcher falls back to.
#[derive(Debug, Clone)]
pub struct NotificationSettings {
    /// Administrator mailbox; receives registration alerts.
    pub admin_email: String,
    /// Designated recipient when a request carries no submitter email.
    pub rebate_email: Option<String>,
}

/// Outcome of handling one event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    templates: Templates,
    settings: NotificationSettings,
}

impl NotificationDispatcher {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        templates: Templates,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            mailer,
            templates,
            settings,
        }
    }

    /// Run the dispatch loop until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PublishedEvent>) {
        loop {
            match receiver.recv().await {
                Ok(published) => {
                    self.handle(&published.event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver every notification `event` calls for.
    pub async fn handle(&self, event: &WorkflowEvent) -> DispatchReport {
        let mut report = DispatchReport::default();
        for email in self.plan(event) {
            match self.mailer.send(&email).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        error = %e,
                        to = %email.to,
                        template = %email.template,
                        event_type = event.event_type(),
                        "Failed to deliver notification"
                    );
                }
            }
        }
        report
    }

    /// The notifications an event produces, in send order.
    pub fn plan(&self, event: &WorkflowEvent) -> Vec<RenderedEmail> {
        let t = &self.templates;
        let mut out = Vec::new();

        match event {
            WorkflowEvent::RequestCreated { request } => {
                let designated =
                    non_empty(&request.email).or(self.settings.rebate_email.as_deref());
                match designated {
                    Some(to) => out.push(t.purchase_request(to, request)),
                    None => tracing::warn!(
                        request_id = request.id,
                        "No designated recipient for purchase request"
                    ),
                }

                if let Some(to) = non_empty(&request.public_email).or(non_empty(&request.email)) {
                    out.push(t.purchase_request_confirmation(to, request));
                }
            }
            WorkflowEvent::ResponseRecorded {
                request,
                action,
                note,
            } => {
                if let Some(to) = non_empty(&request.admin_email) {
                    out.push(t.response_notification(to, request, *action, note));
                }
            }
            WorkflowEvent::StaffRegistered { account } => {
                if let Some(to) = non_empty(&self.settings.admin_email) {
                    let at = account.last_login.unwrap_or(account.created_at);
                    out.push(t.new_registration_admin(to, account, at));
                }
                if let Some(to) = non_empty(&account.email) {
                    out.push(t.registration_received_user(to, account));
                }
            }
            WorkflowEvent::RoleChanged {
                account,
                old_role,
                new_role,
                changed_by,
            } => {
                if old_role != new_role {
                    if let Some(to) = non_empty(&account.email) {
                        let user_name = non_empty(&account.name).unwrap_or(&account.email);
                        out.push(t.role_updated(to, user_name, *old_role, *new_role, changed_by));
                    }
                }
            }
        }

        out
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use staffpurchase_core::lifecycle::ResponseAction;
    use staffpurchase_core::roles::Role;
    use staffpurchase_db::models::staff::StaffAccount;

    use super::*;
    use crate::bus::EventBus;
    use crate::templates::Template;
    use crate::testing::{sample_request, RecordingMailer};

    fn dispatcher(mailer: Arc<RecordingMailer>, rebate: Option<&str>) -> NotificationDispatcher {
        NotificationDispatcher::new(
            mailer,
            Templates::new("https://portal.example"),
            NotificationSettings {
                admin_email: "admin@example.com".into(),
                rebate_email: rebate.map(str::to_string),
            },
        )
    }

    fn account(role: Role) -> StaffAccount {
        StaffAccount {
            uid: "u2".into(),
            email: "kim@example.com".into(),
            name: "Kim".into(),
            photo_url: String::new(),
            role,
            last_login: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    fn recipients(emails: &[RenderedEmail]) -> Vec<(&str, Template)> {
        emails.iter().map(|e| (e.to.as_str(), e.template)).collect()
    }

    #[test]
    fn created_request_notifies_recipient_and_submitter() {
        let d = dispatcher(Arc::default(), None);
        let mut request = sample_request();
        request.public_email = "filler@example.com".into();

        let plan = d.plan(&WorkflowEvent::RequestCreated { request });
        assert_eq!(
            recipients(&plan),
            vec![
                ("sam@store.example", Template::PurchaseRequest),
                ("filler@example.com", Template::PurchaseRequestConfirmation),
            ]
        );
    }

    #[test]
    fn created_request_without_email_falls_back_to_rebate_mailbox() {
        let d = dispatcher(Arc::default(), Some("rebates@example.com"));
        let mut request = sample_request();
        request.email = String::new();

        let plan = d.plan(&WorkflowEvent::RequestCreated { request });
        assert_eq!(
            recipients(&plan),
            vec![("rebates@example.com", Template::PurchaseRequest)]
        );
    }

    #[test]
    fn confirmation_falls_back_to_submitter_email() {
        let d = dispatcher(Arc::default(), None);
        let plan = d.plan(&WorkflowEvent::RequestCreated {
            request: sample_request(),
        });
        assert_eq!(plan[1].to, "sam@store.example");
        assert_eq!(plan[1].template, Template::PurchaseRequestConfirmation);
    }

    #[test]
    fn response_goes_to_administrative_sender() {
        let d = dispatcher(Arc::default(), None);
        let mut request = sample_request();
        request.admin_email = "sender@example.com".into();

        let plan = d.plan(&WorkflowEvent::ResponseRecorded {
            request,
            action: ResponseAction::Reject,
            note: String::new(),
        });
        assert_eq!(
            recipients(&plan),
            vec![("sender@example.com", Template::ResponseNotification)]
        );
        assert!(plan[0].subject.starts_with("REJECTED:"));
    }

    #[test]
    fn registration_alerts_admin_and_user() {
        let d = dispatcher(Arc::default(), None);
        let plan = d.plan(&WorkflowEvent::StaffRegistered {
            account: account(Role::Pending),
        });
        assert_eq!(
            recipients(&plan),
            vec![
                ("admin@example.com", Template::NewRegistrationAdmin),
                ("kim@example.com", Template::RegistrationReceivedUser),
            ]
        );
    }

    #[test]
    fn unchanged_role_sends_nothing() {
        let d = dispatcher(Arc::default(), None);
        let plan = d.plan(&WorkflowEvent::RoleChanged {
            account: account(Role::Staff),
            old_role: Role::Staff,
            new_role: Role::Staff,
            changed_by: "Admin".into(),
        });
        assert!(plan.is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_counted_not_propagated() {
        let mailer = Arc::new(RecordingMailer::failing_for(&["sam@store.example"]));
        let d = dispatcher(Arc::clone(&mailer), None);

        let report = d
            .handle(&WorkflowEvent::RequestCreated {
                request: sample_request(),
            })
            .await;

        assert_eq!(report, DispatchReport { sent: 0, failed: 2 });
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn run_drains_bus_and_stops_when_closed() {
        let mailer = Arc::new(RecordingMailer::default());
        let bus = EventBus::default();
        let handle = tokio::spawn(dispatcher(Arc::clone(&mailer), None).run(bus.subscribe()));

        bus.publish(WorkflowEvent::StaffRegistered {
            account: account(Role::Pending),
        });
        drop(bus);

        handle.await.unwrap();
        assert_eq!(mailer.sent().len(), 2);
    }
}
