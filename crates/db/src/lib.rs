//! Persistence for purchase requests, products and staff accounts.
//!
//! Handlers and background services depend on the traits in [`store`], never
//! on a concrete backend. [`PgStore`] is the production implementation and
//! [`MemoryStore`] backs tests and database-less local runs.

use sqlx::postgres::PgPoolOptions;

pub mod memory;
pub mod models;
pub mod repositories;
pub mod seed;
pub mod store;

pub use memory::MemoryStore;
pub use repositories::PgStore;
pub use store::{ProductStore, PurchaseRequestStore, StaffStore, StoreError, StoreResult};

pub type DbPool = sqlx::PgPool;

/// Embedded schema migrations.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the pool can reach the server.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
