use crate::domain::{Lifecycle, User, UserId};
use crate::ports::{CatalogStore, Result, StoreError};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::user_id_column;

fn map_row_to_user(row: &PgRow) -> Result<User> {
    Ok(User {
        id: user_id_column(row, "id")?,
        name: row.try_get("name")?,
        lifecycle: Lifecycle::from_retired_at(row.try_get("retired_at")?),
    })
}

/// PostgreSQL implementation of `CatalogStore<User>`
pub struct UserRoster {
    pool: PgPool,
}

impl UserRoster {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore<User> for UserRoster {
    async fn check_retired(&self, id: UserId) -> Result<bool> {
        let retired: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users WHERE id = $1 AND retired_at IS NOT NULL
            )
            "#,
        )
        .bind(id.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(retired)
    }

    async fn register(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, name) VALUES ($1, $2)")
            .bind(user.id.value())
            .bind(&user.name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn unretire(&self, id: UserId) -> Result<()> {
        sqlx::query("UPDATE users SET retired_at = NULL WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Retire a user unless they still hold a book
    ///
    /// The user row is locked first. `create_loan` holds a share lock on the
    /// same row until its insert commits, so the active-loan check that
    /// follows (fresh snapshot under READ COMMITTED) sees any loan created
    /// concurrently.
    async fn retire(&self, id: UserId) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT 1 FROM users WHERE id = $1 FOR UPDATE")
            .bind(id.value())
            .fetch_optional(&mut *tx)
            .await?;

        let (blocked, retired): (bool, i64) = sqlx::query_as(
            r#"
            WITH blocking AS (
                SELECT 1
                FROM lending_records
                WHERE user_id = $1 AND retired_at IS NULL
                LIMIT 1
            ),
            retired AS (
                UPDATE users
                SET retired_at = now()
                WHERE id = $1
                  AND retired_at IS NULL
                  AND NOT EXISTS (SELECT 1 FROM blocking)
                RETURNING id
            )
            SELECT
                EXISTS (SELECT 1 FROM blocking) AS blocked,
                (SELECT COUNT(*) FROM retired) AS retired
            "#,
        )
        .bind(id.value())
        .fetch_one(&mut *tx)
        .await?;

        if blocked {
            tx.rollback().await?;
            return Err(StoreError::Referenced);
        }

        tx.commit().await?;
        Ok(retired as u64)
    }

    async fn fetch(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, retired_at
            FROM users
            WHERE id = $1 AND retired_at IS NULL
            "#,
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    async fn list_active(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, retired_at
            FROM users
            WHERE retired_at IS NULL
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_user).collect()
    }
}
