use serde::Serialize;
use sqlx::FromRow;
use staffpurchase_core::types::{DbId, Timestamp};

/// Row from the `products` table. Products are never updated in place.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
}
