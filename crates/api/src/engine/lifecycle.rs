//! Purchase-request lifecycle: creation, token redemption and admin edits.
//!
//! Every status change goes through [`transition`] and is persisted with the
//! store's compare-and-set. Events are published only after the write has
//! committed.

use chrono::Utc;
use staffpurchase_core::error::CoreError;
use staffpurchase_core::lifecycle::transition;
use staffpurchase_core::purchase_request::{
    PurchaseRequestInput, PurchaseRequestPatch, RequestListQuery,
};
use staffpurchase_core::token::{generate_response_token, is_well_formed};
use staffpurchase_core::types::DbId;
use staffpurchase_db::models::purchase_request::{
    NewPurchaseRequest, PublicRequestView, PurchaseRequest, ResponseUpdate,
};
use staffpurchase_db::{PurchaseRequestStore, StoreError};
use staffpurchase_events::{EventBus, WorkflowEvent};

use crate::error::AppResult;

/// Display name recorded as sender for requests created on the public route.
pub const PUBLIC_SENDER_NAME: &str = "Staff Member";

/// Attempts at inserting with a fresh token before giving up on collisions.
const TOKEN_INSERT_ATTEMPTS: usize = 3;

const INVALID_TOKEN: &str = "Invalid token";
const REQUEST_NOT_FOUND: &str = "Request not found";

/// Who a request is sent on behalf of. Denormalized onto the request.
#[derive(Debug, Clone)]
pub struct Sender {
    pub email: String,
    pub name: String,
}

pub struct RequestLifecycle<'a> {
    store: &'a dyn PurchaseRequestStore,
    bus: &'a EventBus,
}

impl<'a> RequestLifecycle<'a> {
    pub fn new(store: &'a dyn PurchaseRequestStore, bus: &'a EventBus) -> Self {
        Self { store, bus }
    }

    /// Validate and persist a new request in `Pending` with a fresh token.
    pub async fn create(
        &self,
        input: PurchaseRequestInput,
        sender: Sender,
    ) -> AppResult<PurchaseRequest> {
        let draft = input.into_draft()?;

        let mut attempt = 0;
        let request = loop {
            attempt += 1;
            let new = NewPurchaseRequest {
                draft: draft.clone(),
                admin_email: sender.email.clone(),
                admin_name: sender.name.clone(),
                response_token: generate_response_token(),
            };
            match self.store.insert(&new).await {
                Ok(request) => break request,
                Err(StoreError::Duplicate(constraint)) if attempt < TOKEN_INSERT_ATTEMPTS => {
                    tracing::warn!(%constraint, attempt, "Response token collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        };

        tracing::info!(
            request_id = request.id,
            store = %request.store_name,
            sender = %request.admin_email,
            "Purchase request created"
        );

        self.bus.publish(WorkflowEvent::RequestCreated {
            request: request.clone(),
        });
        Ok(request)
    }

    /// Look up a request by its response token. The only public lookup path.
    pub async fn resolve_by_token(&self, token: &str) -> AppResult<PurchaseRequest> {
        if !is_well_formed(token) {
            return Err(CoreError::NotFound(INVALID_TOKEN.into()).into());
        }
        self.store
            .find_by_token(token)
            .await?
            .ok_or_else(|| CoreError::NotFound(INVALID_TOKEN.into()).into())
    }

    pub async fn public_view(&self, token: &str) -> AppResult<PublicRequestView> {
        let request = self.resolve_by_token(token).await?;
        Ok(PublicRequestView::from(&request))
    }

    /// Redeem `token` with `action`, retiring the token.
    ///
    /// Of two concurrent calls for one token, the loser of the store's
    /// compare-and-set gets [`CoreError::TokenAlreadyUsed`].
    pub async fn apply_response(
        &self,
        token: &str,
        action: Option<&str>,
        note: Option<String>,
    ) -> AppResult<PurchaseRequest> {
        let current = self.resolve_by_token(token).await?;
        self.respond_to(current, action, note).await
    }

    /// Redeem the token of an already resolved request.
    pub async fn respond_to(
        &self,
        current: PurchaseRequest,
        action: Option<&str>,
        note: Option<String>,
    ) -> AppResult<PurchaseRequest> {
        let (action, status) = transition(current.status, current.token_used, action)?;

        let update = ResponseUpdate {
            status,
            action,
            note: note.unwrap_or_default(),
            responded_at: Utc::now(),
        };

        let request = self
            .store
            .record_response(&current.response_token, &update)
            .await?
            .ok_or(CoreError::TokenAlreadyUsed)?;

        tracing::info!(
            request_id = request.id,
            action = %action,
            status = %request.status,
            "Response recorded"
        );

        self.bus.publish(WorkflowEvent::ResponseRecorded {
            request: request.clone(),
            action,
            note: update.note,
        });
        Ok(request)
    }

    pub async fn get(&self, id: DbId) -> AppResult<PurchaseRequest> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(REQUEST_NOT_FOUND.into()).into())
    }

    pub async fn list(&self, query: RequestListQuery) -> AppResult<Vec<PurchaseRequest>> {
        let filter = query.into_filter()?;
        Ok(self.store.list(&filter).await?)
    }

    /// Merge descriptive fields. Lifecycle columns are never touched.
    pub async fn update(&self, id: DbId, patch: PurchaseRequestPatch) -> AppResult<PurchaseRequest> {
        let changes = patch.into_changes()?;
        let request = self
            .store
            .update(id, &changes)
            .await?
            .ok_or_else(|| CoreError::NotFound(REQUEST_NOT_FOUND.into()))?;

        tracing::info!(request_id = id, "Purchase request updated");
        Ok(request)
    }

    pub async fn delete(&self, id: DbId) -> AppResult<()> {
        if !self.store.delete(id).await? {
            return Err(CoreError::NotFound(REQUEST_NOT_FOUND.into()).into());
        }
        tracing::info!(request_id = id, "Purchase request deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use staffpurchase_core::lifecycle::{RequestStatus, ResponseAction};
    use staffpurchase_db::MemoryStore;

    use super::*;
    use crate::error::AppError;

    fn input() -> PurchaseRequestInput {
        PurchaseRequestInput {
            store_name: "Hunting World".into(),
            employee_name: "Sam Carter".into(),
            order_date: "2026-01-10".into(),
            invoice_date: "2026-01-11".into(),
            product_model: "EXPLORER".into(),
            discount: "30%".into(),
            email: Some("sam@store.example".into()),
            ..Default::default()
        }
    }

    fn sender() -> Sender {
        Sender {
            email: "admin@example.com".into(),
            name: PUBLIC_SENDER_NAME.into(),
        }
    }

    #[tokio::test]
    async fn create_publishes_after_persisting() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let engine = RequestLifecycle::new(&store, &bus);

        let request = engine.create(input(), sender()).await.unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(!request.token_used);
        assert_eq!(request.reminder_count, 0);
        assert!(is_well_formed(&request.response_token));

        let published = rx.recv().await.unwrap();
        assert_matches!(
            published.event,
            WorkflowEvent::RequestCreated { request: r } if r.id == request.id
        );
    }

    #[tokio::test]
    async fn invalid_input_persists_nothing() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let engine = RequestLifecycle::new(&store, &bus);

        let bad = PurchaseRequestInput {
            store_name: "  ".into(),
            ..input()
        };
        assert_matches!(
            engine.create(bad, sender()).await,
            Err(AppError::Core(CoreError::Validation(_)))
        );
        assert!(engine.list(RequestListQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_response_is_rejected() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let engine = RequestLifecycle::new(&store, &bus);
        let created = engine.create(input(), sender()).await.unwrap();

        let first = engine
            .apply_response(&created.response_token, Some("confirm"), None)
            .await
            .unwrap();
        assert_eq!(first.status, RequestStatus::Confirmed);
        assert_eq!(first.response_type.as_deref(), Some("confirm"));
        assert_eq!(first.response_note.as_deref(), Some(""));
        assert!(first.token_used);

        assert_matches!(
            engine
                .apply_response(&created.response_token, Some("reject"), None)
                .await,
            Err(AppError::Core(CoreError::TokenAlreadyUsed))
        );
        assert_eq!(
            engine.get(created.id).await.unwrap().status,
            RequestStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn concurrent_responses_record_exactly_one_transition() {
        let store = Arc::new(MemoryStore::new());
        let bus = Arc::new(EventBus::default());
        let token = RequestLifecycle::new(store.as_ref(), &bus)
            .create(input(), sender())
            .await
            .unwrap()
            .response_token;

        let mut handles = Vec::new();
        for action in ["confirm", "approve", "reject", "needinfo"] {
            let store = Arc::clone(&store);
            let bus = Arc::clone(&bus);
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                RequestLifecycle::new(store.as_ref(), &bus)
                    .apply_response(&token, Some(action), None)
                    .await
                    .is_ok()
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn unknown_action_leaves_record_untouched() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let engine = RequestLifecycle::new(&store, &bus);
        let created = engine.create(input(), sender()).await.unwrap();

        assert_matches!(
            engine
                .apply_response(&created.response_token, Some("escalate"), None)
                .await,
            Err(AppError::Core(CoreError::InvalidAction(_)))
        );

        let after = engine.get(created.id).await.unwrap();
        assert_eq!(after.status, RequestStatus::Pending);
        assert!(!after.token_used);
        assert_eq!(after.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn response_event_carries_note() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let engine = RequestLifecycle::new(&store, &bus);
        let created = engine.create(input(), sender()).await.unwrap();
        let mut rx = bus.subscribe();

        engine
            .apply_response(
                &created.response_token,
                Some("needinfo"),
                Some("Which serial?".into()),
            )
            .await
            .unwrap();

        let published = rx.recv().await.unwrap();
        assert_matches!(
            published.event,
            WorkflowEvent::ResponseRecorded { action: ResponseAction::NeedInfo, note, .. }
                if note == "Which serial?"
        );
    }

    #[tokio::test]
    async fn malformed_or_unknown_tokens_are_not_found() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let engine = RequestLifecycle::new(&store, &bus);

        let forged = "f".repeat(64);
        for token in ["short", forged.as_str()] {
            assert_matches!(
                engine.public_view(token).await,
                Err(AppError::Core(CoreError::NotFound(msg))) if msg == "Invalid token"
            );
        }
    }

    #[tokio::test]
    async fn update_and_delete_missing_request_are_not_found() {
        let store = MemoryStore::new();
        let bus = EventBus::default();
        let engine = RequestLifecycle::new(&store, &bus);

        assert_matches!(
            engine.update(99, PurchaseRequestPatch::default()).await,
            Err(AppError::Core(CoreError::NotFound(_)))
        );
        assert_matches!(
            engine.delete(99).await,
            Err(AppError::Core(CoreError::NotFound(_)))
        );
    }
}
