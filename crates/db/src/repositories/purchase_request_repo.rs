//! Repository for the `purchase_requests` table.

use sqlx::types::Json;
use sqlx::PgPool;
use staffpurchase_core::lifecycle::RequestStatus;
use staffpurchase_core::purchase_request::{PurchaseRequestChanges, RequestFilter};
use staffpurchase_core::types::DbId;

use crate::models::purchase_request::{
    EmailLogEntry, NewPurchaseRequest, PurchaseRequest, ResponseUpdate,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, store_name, employee_name, order_date, invoice_date, product_model, \
                       serial_number, fob, discount, rebate, email, public_email, \
                       admin_email, admin_name, status, response_token, token_used, \
                       response_type, response_note, response_timestamp, reminder_count, \
                       last_reminder_sent, email_sent_log, created_at, updated_at";

/// Provides CRUD and lifecycle operations for purchase requests.
pub struct PurchaseRequestRepo;

impl PurchaseRequestRepo {
    /// Insert a new request in `Pending`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &NewPurchaseRequest,
    ) -> Result<PurchaseRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO purchase_requests
                (store_name, employee_name, order_date, invoice_date, product_model,
                 serial_number, fob, discount, rebate, email, public_email,
                 admin_email, admin_name, status, response_token)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );
        let d = &input.draft;
        sqlx::query_as::<_, PurchaseRequest>(&query)
            .bind(&d.store_name)
            .bind(&d.employee_name)
            .bind(d.order_date)
            .bind(d.invoice_date)
            .bind(&d.product_model)
            .bind(&d.serial_number)
            .bind(&d.fob)
            .bind(&d.discount)
            .bind(&d.rebate)
            .bind(&d.email)
            .bind(&d.public_email)
            .bind(&input.admin_email)
            .bind(&input.admin_name)
            .bind(RequestStatus::Pending.as_str())
            .bind(&input.response_token)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PurchaseRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM purchase_requests WHERE id = $1");
        sqlx::query_as::<_, PurchaseRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve a response token (served by the unique index).
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<PurchaseRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM purchase_requests WHERE response_token = $1");
        sqlx::query_as::<_, PurchaseRequest>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// List requests matching the filter, newest first.
    ///
    /// Absent criteria bind `NULL` and drop out of the predicate. Substring
    /// matches use `strpos` so `%` and `_` in the needle are literal.
    pub async fn list(
        pool: &PgPool,
        filter: &RequestFilter,
    ) -> Result<Vec<PurchaseRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM purchase_requests
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR strpos(lower(store_name), lower($2)) > 0)
               AND ($3::TEXT IS NULL OR strpos(lower(employee_name), lower($3)) > 0)
               AND ($4::TIMESTAMPTZ IS NULL OR created_at >= $4)
               AND ($5::TIMESTAMPTZ IS NULL OR created_at <= $5)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, PurchaseRequest>(&query)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.store.as_deref())
            .bind(filter.employee.as_deref())
            .bind(filter.created_from)
            .bind(filter.created_to)
            .fetch_all(pool)
            .await
    }

    /// Apply descriptive-field changes. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &PurchaseRequestChanges,
    ) -> Result<Option<PurchaseRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE purchase_requests SET
                store_name = COALESCE($2, store_name),
                employee_name = COALESCE($3, employee_name),
                order_date = COALESCE($4, order_date),
                invoice_date = COALESCE($5, invoice_date),
                product_model = COALESCE($6, product_model),
                serial_number = COALESCE($7, serial_number),
                fob = COALESCE($8, fob),
                discount = COALESCE($9, discount),
                rebate = COALESCE($10, rebate),
                email = COALESCE($11, email),
                public_email = COALESCE($12, public_email),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PurchaseRequest>(&query)
            .bind(id)
            .bind(&changes.store_name)
            .bind(&changes.employee_name)
            .bind(changes.order_date)
            .bind(changes.invoice_date)
            .bind(&changes.product_model)
            .bind(&changes.serial_number)
            .bind(&changes.fob)
            .bind(&changes.discount)
            .bind(&changes.rebate)
            .bind(&changes.email)
            .bind(&changes.public_email)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM purchase_requests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Redeem a token: a single conditional `UPDATE` on `token_used = FALSE`.
    ///
    /// The status guard keeps a request that was somehow moved out of
    /// `Pending` without retiring its token from transitioning again.
    pub async fn record_response(
        pool: &PgPool,
        token: &str,
        update: &ResponseUpdate,
    ) -> Result<Option<PurchaseRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE purchase_requests SET
                status = $2,
                response_type = $3,
                response_note = $4,
                response_timestamp = $5,
                token_used = TRUE,
                updated_at = $5
             WHERE response_token = $1 AND token_used = FALSE AND status = $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PurchaseRequest>(&query)
            .bind(token)
            .bind(update.status.as_str())
            .bind(update.action.as_str())
            .bind(&update.note)
            .bind(update.responded_at)
            .bind(RequestStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }

    pub async fn list_pending(pool: &PgPool) -> Result<Vec<PurchaseRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM purchase_requests WHERE status = $1 ORDER BY created_at"
        );
        sqlx::query_as::<_, PurchaseRequest>(&query)
            .bind(RequestStatus::Pending.as_str())
            .fetch_all(pool)
            .await
    }

    /// Reminder bookkeeping in one statement: append to the JSONB log,
    /// increment the counter and stamp `last_reminder_sent`. Rows that have
    /// left `Pending` or whose token is spent are not touched.
    pub async fn record_reminder(
        pool: &PgPool,
        id: DbId,
        entry: &EmailLogEntry,
    ) -> Result<Option<PurchaseRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE purchase_requests SET
                email_sent_log = email_sent_log || $2::JSONB,
                reminder_count = reminder_count + 1,
                last_reminder_sent = $3,
                updated_at = $3
             WHERE id = $1 AND status = $4 AND token_used = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PurchaseRequest>(&query)
            .bind(id)
            .bind(Json(std::slice::from_ref(entry)))
            .bind(entry.sent_at)
            .bind(RequestStatus::Pending.as_str())
            .fetch_optional(pool)
            .await
    }
}
