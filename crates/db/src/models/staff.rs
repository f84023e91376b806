//! Staff account model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use staffpurchase_core::roles::Role;
use staffpurchase_core::types::Timestamp;

/// Row from the `staff_accounts` table, keyed by identity subject.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAccount {
    pub uid: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub last_login: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Values written on every identity sync. Inserts a new account or refreshes
/// an existing one; `role` is only written for a new account.
#[derive(Debug, Clone)]
pub struct StaffUpsert {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub photo_url: String,
    pub role: Role,
    pub last_login: Timestamp,
}

/// Staff listing entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub last_login: Option<Timestamp>,
}

impl From<StaffAccount> for StaffSummary {
    fn from(a: StaffAccount) -> Self {
        Self {
            id: a.uid,
            name: a.name,
            email: a.email,
            role: a.role,
            last_login: a.last_login,
        }
    }
}
