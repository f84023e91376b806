//! In-process store used by tests and by local runs without `DATABASE_URL`.
//!
//! All collections sit behind one [`Mutex`], so every trait method is a
//! single critical section and the token compare-and-set is as atomic as the
//! conditional `UPDATE` in PostgreSQL.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use staffpurchase_core::lifecycle::RequestStatus;
use staffpurchase_core::purchase_request::{PurchaseRequestChanges, RequestFilter};
use staffpurchase_core::roles::Role;
use staffpurchase_core::types::DbId;

use crate::models::product::Product;
use crate::models::purchase_request::{
    EmailLogEntry, NewPurchaseRequest, PurchaseRequest, ResponseUpdate,
};
use crate::models::staff::{StaffAccount, StaffUpsert};
use crate::store::{ProductStore, PurchaseRequestStore, StaffStore, StoreError, StoreResult};

#[derive(Default)]
struct Collections {
    next_request_id: DbId,
    next_product_id: DbId,
    requests: BTreeMap<DbId, PurchaseRequest>,
    products: BTreeMap<DbId, Product>,
    staff: BTreeMap<String, StaffAccount>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        // A poisoned lock only means another test thread panicked mid-write;
        // the maps themselves are still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PurchaseRequestStore for MemoryStore {
    async fn insert(&self, input: &NewPurchaseRequest) -> StoreResult<PurchaseRequest> {
        let mut c = self.lock();
        if c.requests
            .values()
            .any(|r| r.response_token == input.response_token)
        {
            return Err(StoreError::Duplicate(
                "uq_purchase_requests_response_token".into(),
            ));
        }

        c.next_request_id += 1;
        let now = Utc::now();
        let d = input.draft.clone();
        let record = PurchaseRequest {
            id: c.next_request_id,
            store_name: d.store_name,
            employee_name: d.employee_name,
            order_date: d.order_date,
            invoice_date: d.invoice_date,
            product_model: d.product_model,
            serial_number: d.serial_number,
            fob: d.fob,
            discount: d.discount,
            rebate: d.rebate,
            email: d.email,
            public_email: d.public_email,
            admin_email: input.admin_email.clone(),
            admin_name: input.admin_name.clone(),
            status: RequestStatus::Pending,
            response_token: input.response_token.clone(),
            token_used: false,
            response_type: None,
            response_note: None,
            response_timestamp: None,
            reminder_count: 0,
            last_reminder_sent: None,
            email_sent_log: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        c.requests.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: DbId) -> StoreResult<Option<PurchaseRequest>> {
        Ok(self.lock().requests.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> StoreResult<Option<PurchaseRequest>> {
        Ok(self
            .lock()
            .requests
            .values()
            .find(|r| r.response_token == token)
            .cloned())
    }

    async fn list(&self, filter: &RequestFilter) -> StoreResult<Vec<PurchaseRequest>> {
        let mut rows: Vec<PurchaseRequest> = self
            .lock()
            .requests
            .values()
            .filter(|r| filter.matches(r.status, &r.store_name, &r.employee_name, r.created_at))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn update(
        &self,
        id: DbId,
        changes: &PurchaseRequestChanges,
    ) -> StoreResult<Option<PurchaseRequest>> {
        let mut c = self.lock();
        let Some(r) = c.requests.get_mut(&id) else {
            return Ok(None);
        };

        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        set(&mut r.store_name, &changes.store_name);
        set(&mut r.employee_name, &changes.employee_name);
        set(&mut r.order_date, &changes.order_date);
        set(&mut r.invoice_date, &changes.invoice_date);
        set(&mut r.product_model, &changes.product_model);
        set(&mut r.serial_number, &changes.serial_number);
        set(&mut r.fob, &changes.fob);
        set(&mut r.discount, &changes.discount);
        set(&mut r.rebate, &changes.rebate);
        set(&mut r.email, &changes.email);
        set(&mut r.public_email, &changes.public_email);
        r.updated_at = Utc::now();

        Ok(Some(r.clone()))
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.lock().requests.remove(&id).is_some())
    }

    async fn record_response(
        &self,
        token: &str,
        update: &ResponseUpdate,
    ) -> StoreResult<Option<PurchaseRequest>> {
        let mut c = self.lock();
        let Some(r) = c.requests.values_mut().find(|r| {
            r.response_token == token && !r.token_used && r.status == RequestStatus::Pending
        }) else {
            return Ok(None);
        };

        r.status = update.status;
        r.response_type = Some(update.action.as_str().to_string());
        r.response_note = Some(update.note.clone());
        r.response_timestamp = Some(update.responded_at);
        r.token_used = true;
        r.updated_at = update.responded_at;

        Ok(Some(r.clone()))
    }

    async fn list_pending(&self) -> StoreResult<Vec<PurchaseRequest>> {
        let mut rows: Vec<PurchaseRequest> = self
            .lock()
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.created_at);
        Ok(rows)
    }

    async fn record_reminder(
        &self,
        id: DbId,
        entry: &EmailLogEntry,
    ) -> StoreResult<Option<PurchaseRequest>> {
        let mut c = self.lock();
        let Some(r) = c.requests.get_mut(&id) else {
            return Ok(None);
        };
        if r.status != RequestStatus::Pending || r.token_used {
            return Ok(None);
        }

        r.email_sent_log.push(entry.clone());
        r.reminder_count += 1;
        r.last_reminder_sent = Some(entry.sent_at);
        r.updated_at = entry.sent_at;

        Ok(Some(r.clone()))
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn list(&self) -> StoreResult<Vec<Product>> {
        let mut rows: Vec<Product> = self.lock().products.values().cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Product>> {
        Ok(self
            .lock()
            .products
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn insert(&self, name: &str) -> StoreResult<Product> {
        let mut c = self.lock();
        if c.products.values().any(|p| p.name == name) {
            return Err(StoreError::Duplicate("uq_products_name".into()));
        }
        c.next_product_id += 1;
        let product = Product {
            id: c.next_product_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        c.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn delete(&self, id: DbId) -> StoreResult<bool> {
        Ok(self.lock().products.remove(&id).is_some())
    }
}

#[async_trait]
impl StaffStore for MemoryStore {
    async fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.lock().staff.is_empty())
    }

    async fn find(&self, uid: &str) -> StoreResult<Option<StaffAccount>> {
        Ok(self.lock().staff.get(uid).cloned())
    }

    async fn upsert(&self, input: &StaffUpsert) -> StoreResult<StaffAccount> {
        let mut c = self.lock();
        let (role, created_at) = c
            .staff
            .get(&input.uid)
            .map(|a| (a.role, a.created_at))
            .unwrap_or_else(|| (input.role, Utc::now()));
        let account = StaffAccount {
            uid: input.uid.clone(),
            email: input.email.clone(),
            name: input.name.clone(),
            photo_url: input.photo_url.clone(),
            role,
            last_login: Some(input.last_login),
            created_at,
        };
        c.staff.insert(account.uid.clone(), account.clone());
        Ok(account)
    }

    async fn list(&self) -> StoreResult<Vec<StaffAccount>> {
        let mut rows: Vec<StaffAccount> = self.lock().staff.values().cloned().collect();
        rows.sort_by_key(|a| a.created_at);
        Ok(rows)
    }

    async fn set_role(&self, uid: &str, role: Role) -> StoreResult<Option<StaffAccount>> {
        let mut c = self.lock();
        let Some(account) = c.staff.get_mut(uid) else {
            return Ok(None);
        };
        let previous = account.clone();
        account.role = role;
        Ok(Some(previous))
    }

    async fn delete(&self, uid: &str) -> StoreResult<bool> {
        Ok(self.lock().staff.remove(uid).is_some())
    }
}
