//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Engines publish a [`WorkflowEvent`] after the corresponding store write has
//! succeeded. Subscribers (the notification dispatcher) never feed back into
//! the write path, so a slow or failing mailer cannot undo a transition.

use chrono::Utc;
use staffpurchase_core::lifecycle::ResponseAction;
use staffpurchase_core::roles::Role;
use staffpurchase_core::types::Timestamp;
use staffpurchase_db::models::purchase_request::PurchaseRequest;
use staffpurchase_db::models::staff::StaffAccount;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// WorkflowEvent
// ---------------------------------------------------------------------------

/// Something that happened to a purchase request or a staff account.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// A request was persisted in `Pending` with a fresh token.
    RequestCreated { request: PurchaseRequest },

    /// A response token was redeemed. `request` is the row after the update.
    ResponseRecorded {
        request: PurchaseRequest,
        action: ResponseAction,
        note: String,
    },

    /// A new identity was admitted as `pending`.
    StaffRegistered { account: StaffAccount },

    /// An admin changed someone's role.
    RoleChanged {
        account: StaffAccount,
        old_role: Role,
        new_role: Role,
        /// Display name of the acting admin (falls back to their email).
        changed_by: String,
    },
}

impl WorkflowEvent {
    /// Dot-separated name used in logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            WorkflowEvent::RequestCreated { .. } => "request.created",
            WorkflowEvent::ResponseRecorded { .. } => "request.response_recorded",
            WorkflowEvent::StaffRegistered { .. } => "staff.registered",
            WorkflowEvent::RoleChanged { .. } => "staff.role_changed",
        }
    }
}

/// A [`WorkflowEvent`] stamped with its publication time.
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub event: WorkflowEvent,
    pub timestamp: Timestamp,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus, shared as `Arc<EventBus>`.
pub struct EventBus {
    sender: broadcast::Sender<PublishedEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed events are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: WorkflowEvent) {
        tracing::debug!(event_type = event.event_type(), "Publishing workflow event");
        let _ = self.sender.send(PublishedEvent {
            event,
            timestamp: Utc::now(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> StaffAccount {
        StaffAccount {
            uid: "u1".into(),
            email: "new@example.com".into(),
            name: "New".into(),
            photo_url: String::new(),
            role: Role::Pending,
            last_login: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(WorkflowEvent::StaffRegistered { account: account() });

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");
        assert_eq!(e1.event.event_type(), "staff.registered");
        assert_eq!(e2.event.event_type(), "staff.registered");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(WorkflowEvent::StaffRegistered { account: account() });
    }
}
