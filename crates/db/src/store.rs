//! Backend-agnostic store traits.
//!
//! Every method is a single atomic operation against the backend. The
//! lifecycle and reminder writes in particular must not be split into a
//! read followed by a write.

use async_trait::async_trait;
use staffpurchase_core::purchase_request::{PurchaseRequestChanges, RequestFilter};
use staffpurchase_core::roles::Role;
use staffpurchase_core::types::DbId;

use crate::models::product::Product;
use crate::models::purchase_request::{
    EmailLogEntry, NewPurchaseRequest, PurchaseRequest, ResponseUpdate,
};
use crate::models::staff::{StaffAccount, StaffUpsert};

/// Failure of the storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected the write.
    #[error("Duplicate value violates unique constraint: {0}")]
    Duplicate(String),
}

impl StoreError {
    /// Classify a sqlx error, lifting unique violations on `uq_` constraints
    /// into [`StoreError::Duplicate`].
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return StoreError::Duplicate(constraint.to_string());
                }
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PurchaseRequestStore: Send + Sync {
    async fn insert(&self, input: &NewPurchaseRequest) -> StoreResult<PurchaseRequest>;

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PurchaseRequest>>;

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<PurchaseRequest>>;

    /// Requests matching `filter`, newest first.
    async fn list(&self, filter: &RequestFilter) -> StoreResult<Vec<PurchaseRequest>>;

    /// Apply descriptive-field changes and bump `updated_at`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    async fn update(
        &self,
        id: DbId,
        changes: &PurchaseRequestChanges,
    ) -> StoreResult<Option<PurchaseRequest>>;

    /// Hard delete. Returns `true` if a row was removed.
    async fn delete(&self, id: DbId) -> StoreResult<bool>;

    /// Redeem a response token.
    ///
    /// Compare-and-set on `token_used = false`: returns the updated row, or
    /// `None` when the token is unknown or was already redeemed. Of two
    /// concurrent calls for one token at most one gets `Some`.
    async fn record_response(
        &self,
        token: &str,
        update: &ResponseUpdate,
    ) -> StoreResult<Option<PurchaseRequest>>;

    /// All requests still in `Pending`.
    async fn list_pending(&self) -> StoreResult<Vec<PurchaseRequest>>;

    /// Append `entry` to the email log, increment `reminder_count` and set
    /// `last_reminder_sent` in one write.
    ///
    /// Returns `None` when the request is absent, no longer `Pending`, or its
    /// token has been redeemed.
    async fn record_reminder(
        &self,
        id: DbId,
        entry: &EmailLogEntry,
    ) -> StoreResult<Option<PurchaseRequest>>;

    /// Backend liveness probe.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products ordered by name.
    async fn list(&self) -> StoreResult<Vec<Product>>;

    /// Exact, case-sensitive name lookup.
    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>>;

    async fn insert(&self, name: &str) -> StoreResult<Product>;

    async fn delete(&self, id: DbId) -> StoreResult<bool>;
}

#[async_trait]
pub trait StaffStore: Send + Sync {
    /// Whether no account exists yet. An existence probe, not a count.
    async fn is_empty(&self) -> StoreResult<bool>;

    async fn find(&self, uid: &str) -> StoreResult<Option<StaffAccount>>;

    /// Insert or refresh `input.uid`. An existing account keeps its role.
    async fn upsert(&self, input: &StaffUpsert) -> StoreResult<StaffAccount>;

    async fn list(&self) -> StoreResult<Vec<StaffAccount>>;

    /// Returns the account as it was before the change, or `None` when absent.
    async fn set_role(&self, uid: &str, role: Role) -> StoreResult<Option<StaffAccount>>;

    async fn delete(&self, uid: &str) -> StoreResult<bool>;
}
