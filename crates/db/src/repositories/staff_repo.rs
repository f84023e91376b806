//! Repository for the `staff_accounts` table.

use sqlx::PgPool;
use staffpurchase_core::roles::Role;

use crate::models::staff::{StaffAccount, StaffUpsert};

const COLUMNS: &str = "uid, email, name, photo_url, role, last_login, created_at";

pub struct StaffRepo;

impl StaffRepo {
    /// `true` when the table has no rows at all.
    pub async fn is_empty(pool: &PgPool) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM staff_accounts)")
            .fetch_one(pool)
            .await?;
        Ok(!exists)
    }

    pub async fn find(pool: &PgPool, uid: &str) -> Result<Option<StaffAccount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM staff_accounts WHERE uid = $1");
        sqlx::query_as::<_, StaffAccount>(&query)
            .bind(uid)
            .fetch_optional(pool)
            .await
    }

    /// Insert or refresh an account keyed by `uid`.
    ///
    /// `input.role` only applies to a new row; an existing row keeps its role.
    pub async fn upsert(pool: &PgPool, input: &StaffUpsert) -> Result<StaffAccount, sqlx::Error> {
        let query = format!(
            "INSERT INTO staff_accounts (uid, email, name, photo_url, role, last_login)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (uid) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name,
                photo_url = EXCLUDED.photo_url,
                last_login = EXCLUDED.last_login
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StaffAccount>(&query)
            .bind(&input.uid)
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.photo_url)
            .bind(input.role.as_str())
            .bind(input.last_login)
            .fetch_one(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<StaffAccount>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM staff_accounts ORDER BY created_at");
        sqlx::query_as::<_, StaffAccount>(&query).fetch_all(pool).await
    }

    /// Change the role, returning the row as it was before the update.
    pub async fn set_role(
        pool: &PgPool,
        uid: &str,
        role: Role,
    ) -> Result<Option<StaffAccount>, sqlx::Error> {
        let query = format!(
            "UPDATE staff_accounts AS s SET role = $2
             FROM (SELECT {COLUMNS} FROM staff_accounts WHERE uid = $1 FOR UPDATE) AS old
             WHERE s.uid = old.uid
             RETURNING old.uid, old.email, old.name, old.photo_url, old.role,
                       old.last_login, old.created_at"
        );
        sqlx::query_as::<_, StaffAccount>(&query)
            .bind(uid)
            .bind(role.as_str())
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, uid: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM staff_accounts WHERE uid = $1")
            .bind(uid)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
