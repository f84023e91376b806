//! PostgreSQL repositories and the [`PgStore`] adapter that exposes them
//! through the store traits.

mod product_repo;
mod purchase_request_repo;
mod staff_repo;

pub use product_repo::ProductRepo;
pub use purchase_request_repo::PurchaseRequestRepo;
pub use staff_repo::StaffRepo;

use async_trait::async_trait;
use staffpurchase_core::purchase_request::{PurchaseRequestChanges, RequestFilter};
use staffpurchase_core::roles::Role;
use staffpurchase_core::types::DbId;

use crate::models::product::Product;
use crate::models::purchase_request::{
    EmailLogEntry, NewPurchaseRequest, PurchaseRequest, ResponseUpdate,
};
use crate::models::staff::{StaffAccount, StaffUpsert};
use crate::store::{ProductStore, PurchaseRequestStore, StaffStore, StoreError, StoreResult};
use crate::DbPool;

/// Store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseRequestStore for PgStore {
    async fn insert(&self, input: &NewPurchaseRequest) -> StoreResult<PurchaseRequest> {
        PurchaseRequestRepo::create(&self.pool, input)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PurchaseRequest>> {
        Ok(PurchaseRequestRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<PurchaseRequest>> {
        Ok(PurchaseRequestRepo::find_by_token(&self.pool, token).await?)
    }

    async fn list(&self, filter: &RequestFilter) -> StoreResult<Vec<PurchaseRequest>> {
        Ok(PurchaseRequestRepo::list(&self.pool, filter).await?)
    }

    async fn update(
        &self,
        id: DbId,
        changes: &PurchaseRequestChanges,
    ) -> StoreResult<Option<PurchaseRequest>> {
        Ok(PurchaseRequestRepo::update(&self.pool, id, changes).await?)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        Ok(PurchaseRequestRepo::delete(&self.pool, id).await?)
    }

    async fn record_response(
        &self,
        token: &str,
        update: &ResponseUpdate,
    ) -> StoreResult<Option<PurchaseRequest>> {
        Ok(PurchaseRequestRepo::record_response(&self.pool, token, update).await?)
    }

    async fn list_pending(&self) -> StoreResult<Vec<PurchaseRequest>> {
        Ok(PurchaseRequestRepo::list_pending(&self.pool).await?)
    }

    async fn record_reminder(
        &self,
        id: DbId,
        entry: &EmailLogEntry,
    ) -> StoreResult<Option<PurchaseRequest>> {
        Ok(PurchaseRequestRepo::record_reminder(&self.pool, id, entry).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}

#[async_trait]
impl ProductStore for PgStore {
    async fn list(&self) -> StoreResult<Vec<Product>> {
        Ok(ProductRepo::list(&self.pool).await?)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        Ok(ProductRepo::find_by_name(&self.pool, name).await?)
    }

    async fn insert(&self, name: &str) -> StoreResult<Product> {
        ProductRepo::create(&self.pool, name)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        Ok(ProductRepo::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl StaffStore for PgStore {
    async fn is_empty(&self) -> StoreResult<bool> {
        Ok(StaffRepo::is_empty(&self.pool).await?)
    }

    async fn find(&self, uid: &str) -> StoreResult<Option<StaffAccount>> {
        Ok(StaffRepo::find(&self.pool, uid).await?)
    }

    async fn upsert(&self, input: &StaffUpsert) -> StoreResult<StaffAccount> {
        Ok(StaffRepo::upsert(&self.pool, input).await?)
    }

    async fn list(&self) -> StoreResult<Vec<StaffAccount>> {
        Ok(StaffRepo::list(&self.pool).await?)
    }

    async fn set_role(&self, uid: &str, role: Role) -> StoreResult<Option<StaffAccount>> {
        Ok(StaffRepo::set_role(&self.pool, uid, role).await?)
    }

    async fn delete(&self, uid: &str) -> StoreResult<bool> {
        Ok(StaffRepo::delete(&self.pool, uid).await?)
    }
}
