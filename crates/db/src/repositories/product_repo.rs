//! Repository for the `products` table.

use sqlx::PgPool;
use staffpurchase_core::types::DbId;

use crate::models::product::Product;

const COLUMNS: &str = "id, name, created_at";

pub struct ProductRepo;

impl ProductRepo {
    pub async fn list(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products ORDER BY name");
        sqlx::query_as::<_, Product>(&query).fetch_all(pool).await
    }

    /// Find a product by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE name = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, name: &str) -> Result<Product, sqlx::Error> {
        let query = format!("INSERT INTO products (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Product>(&query)
            .bind(name)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
