//! Purchase-request input validation, partial updates and list filters.
//!
//! Everything here is pure: inputs arrive as loosely typed JSON bodies or
//! query strings and leave as validated drafts the store layer can persist.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::error::CoreError;
use crate::lifecycle::RequestStatus;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Body of a purchase-request submission (public or admin route).
#[derive(Debug, Default, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseRequestInput {
    #[validate(length(min = 1, message = "Store name is required"))]
    pub store_name: String,
    #[validate(length(min = 1, message = "Employee name is required"))]
    pub employee_name: String,
    #[validate(length(min = 1, message = "Order date is required"))]
    pub order_date: String,
    #[validate(length(min = 1, message = "Invoice date is required"))]
    pub invoice_date: String,
    #[validate(length(min = 1, message = "Product model is required"))]
    pub product_model: String,
    #[validate(length(min = 1, message = "Discount is required"))]
    pub discount: String,
    pub serial_number: Option<String>,
    pub fob: Option<String>,
    pub rebate: Option<String>,
    pub email: Option<String>,
    pub public_email: Option<String>,
}

/// A validated submission. Optional text fields are stored as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequestDraft {
    pub store_name: String,
    pub employee_name: String,
    pub order_date: Timestamp,
    pub invoice_date: Timestamp,
    pub product_model: String,
    pub serial_number: String,
    pub fob: String,
    pub discount: String,
    pub rebate: String,
    pub email: String,
    pub public_email: String,
}

impl PurchaseRequestInput {
    /// Trim, check required fields and parse dates.
    pub fn into_draft(self) -> Result<PurchaseRequestDraft, CoreError> {
        let trimmed = PurchaseRequestInput {
            store_name: self.store_name.trim().to_string(),
            employee_name: self.employee_name.trim().to_string(),
            order_date: self.order_date.trim().to_string(),
            invoice_date: self.invoice_date.trim().to_string(),
            product_model: self.product_model.trim().to_string(),
            discount: self.discount.trim().to_string(),
            ..self
        };
        trimmed
            .validate()
            .map_err(|e| CoreError::Validation(describe_validation_errors(&e)))?;

        Ok(PurchaseRequestDraft {
            order_date: parse_timestamp("orderDate", &trimmed.order_date)?,
            invoice_date: parse_timestamp("invoiceDate", &trimmed.invoice_date)?,
            store_name: trimmed.store_name,
            employee_name: trimmed.employee_name,
            product_model: trimmed.product_model,
            discount: trimmed.discount,
            serial_number: optional_text(trimmed.serial_number),
            fob: optional_text(trimmed.fob),
            rebate: optional_text(trimmed.rebate),
            email: optional_text(trimmed.email),
            public_email: optional_text(trimmed.public_email),
        })
    }
}

fn optional_text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Flatten `validator` errors into one message, ordered by field name.
pub fn describe_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    for (field, errs) in errors.field_errors() {
        for err in errs.iter() {
            let message = err
                .message
                .as_deref()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("{field} is invalid"));
            messages.push((field.to_string(), message));
        }
    }
    messages.sort();
    messages
        .into_iter()
        .map(|(_, message)| message)
        .collect::<Vec<_>>()
        .join("; ")
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
pub fn parse_timestamp(field: &str, value: &str) -> Result<Timestamp, CoreError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    parse_date(field, value).map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// Like [`parse_timestamp`], but a date-only value means the end of that day.
pub fn parse_upper_bound(field: &str, value: &str) -> Result<Timestamp, CoreError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = parse_date(field, value)?;
    date.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| invalid_date(field))
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid_date(field))
}

fn invalid_date(field: &str) -> CoreError {
    CoreError::Validation(format!(
        "Invalid {field}: expected YYYY-MM-DD or an RFC 3339 timestamp"
    ))
}

// ---------------------------------------------------------------------------
// Admin update
// ---------------------------------------------------------------------------

/// Partial admin edit. Unknown keys (`status`, `tokenUsed`, `id`,
/// `createdAt`, ...) are ignored by deserialization.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseRequestPatch {
    pub store_name: Option<String>,
    pub employee_name: Option<String>,
    pub order_date: Option<String>,
    pub invoice_date: Option<String>,
    pub product_model: Option<String>,
    pub serial_number: Option<String>,
    pub fob: Option<String>,
    pub discount: Option<String>,
    pub rebate: Option<String>,
    pub email: Option<String>,
    pub public_email: Option<String>,
}

/// Validated descriptive-field changes. `None` leaves the column untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurchaseRequestChanges {
    pub store_name: Option<String>,
    pub employee_name: Option<String>,
    pub order_date: Option<Timestamp>,
    pub invoice_date: Option<Timestamp>,
    pub product_model: Option<String>,
    pub serial_number: Option<String>,
    pub fob: Option<String>,
    pub discount: Option<String>,
    pub rebate: Option<String>,
    pub email: Option<String>,
    pub public_email: Option<String>,
}

impl PurchaseRequestPatch {
    pub fn into_changes(self) -> Result<PurchaseRequestChanges, CoreError> {
        let order_date = self
            .order_date
            .map(|v| parse_timestamp("orderDate", v.trim()))
            .transpose()?;
        let invoice_date = self
            .invoice_date
            .map(|v| parse_timestamp("invoiceDate", v.trim()))
            .transpose()?;

        Ok(PurchaseRequestChanges {
            store_name: required_change("storeName", self.store_name)?,
            employee_name: required_change("employeeName", self.employee_name)?,
            order_date,
            invoice_date,
            product_model: required_change("productModel", self.product_model)?,
            discount: required_change("discount", self.discount)?,
            serial_number: self.serial_number.map(|v| v.trim().to_string()),
            fob: self.fob.map(|v| v.trim().to_string()),
            rebate: self.rebate.map(|v| v.trim().to_string()),
            email: self.email.map(|v| v.trim().to_string()),
            public_email: self.public_email.map(|v| v.trim().to_string()),
        })
    }
}

fn required_change(field: &str, value: Option<String>) -> Result<Option<String>, CoreError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => Err(CoreError::Validation(format!("{field} cannot be empty"))),
        other => Ok(other),
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Raw admin list query string.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub store: Option<String>,
    pub employee: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Parsed list filter. Every criterion is optional and they combine with AND.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    /// Case-insensitive substring of the store name.
    pub store: Option<String>,
    /// Case-insensitive substring of the employee name.
    pub employee: Option<String>,
    /// Inclusive lower bound on `createdAt`.
    pub created_from: Option<Timestamp>,
    /// Inclusive upper bound on `createdAt`.
    pub created_to: Option<Timestamp>,
}

impl RequestListQuery {
    pub fn into_filter(self) -> Result<RequestFilter, CoreError> {
        let non_empty = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };

        Ok(RequestFilter {
            status: non_empty(self.status)
                .map(|s| s.parse::<RequestStatus>())
                .transpose()?,
            store: non_empty(self.store),
            employee: non_empty(self.employee),
            created_from: non_empty(self.start_date)
                .map(|s| parse_timestamp("startDate", &s))
                .transpose()?,
            created_to: non_empty(self.end_date)
                .map(|s| parse_upper_bound("endDate", &s))
                .transpose()?,
        })
    }
}

impl RequestFilter {
    /// In-process evaluation of the filter, mirroring the SQL predicate.
    pub fn matches(
        &self,
        status: RequestStatus,
        store_name: &str,
        employee_name: &str,
        created_at: Timestamp,
    ) -> bool {
        self.status.is_none_or(|s| s == status)
            && self
                .store
                .as_deref()
                .is_none_or(|needle| contains_ignore_case(store_name, needle))
            && self
                .employee
                .as_deref()
                .is_none_or(|needle| contains_ignore_case(employee_name, needle))
            && self.created_from.is_none_or(|from| created_at >= from)
            && self.created_to.is_none_or(|to| created_at <= to)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
