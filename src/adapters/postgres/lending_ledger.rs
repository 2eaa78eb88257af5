use crate::domain::{Book, Isbn, Lifecycle, Loan, LoanId, UserId};
use crate::ports::{LendingLedger as LendingLedgerPort, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::{isbn_column, map_row_to_loan};

/// PostgreSQL実装の貸出台帳
///
/// 「1冊につき有効な貸出は1件まで」は部分ユニークインデックス
/// `lending_records_active_isbn`で保証する。
pub struct LendingLedger {
    pool: PgPool,
}

impl LendingLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LendingLedgerPort for LendingLedger {
    async fn is_book_available(&self, isbn: Isbn) -> Result<bool> {
        let available: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM books b
                LEFT JOIN lending_records lr
                    ON lr.isbn = b.isbn AND lr.retired_at IS NULL
                WHERE b.isbn = $1
                  AND b.retired_at IS NULL
                  AND lr.loan_id IS NULL
            )
            "#,
        )
        .bind(isbn.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(available)
    }

    /// 条件付きINSERT
    ///
    /// 会員・書籍が有効な場合のみ1行挿入する。有効な貸出との重複は
    /// ユニーク制約違反となり`StoreError::Conflict`に変換される。
    ///
    /// 会員の行は`FOR SHARE`でロックする。会員の退役（`FOR UPDATE`）と
    /// 直列化され、退役済みの会員に有効な貸出が残ることはない。
    async fn create_loan(&self, user_id: UserId, isbn: Isbn) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            INSERT INTO lending_records (loan_id, user_id, isbn)
            SELECT $1, u.id, b.isbn
            FROM users u, books b
            WHERE u.id = $2 AND u.retired_at IS NULL
              AND b.isbn = $3 AND b.retired_at IS NULL
            FOR SHARE OF u
            RETURNING loan_id, user_id, isbn, loaned_at, retired_at
            "#,
        )
        .bind(LoanId::new().value())
        .bind(user_id.value())
        .bind(isbn.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn close_loan(&self, isbn: Isbn) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE lending_records
            SET retired_at = now()
            WHERE isbn = $1 AND retired_at IS NULL
            "#,
        )
        .bind(isbn.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn active_loan(&self, isbn: Isbn) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT loan_id, user_id, isbn, loaned_at, retired_at
            FROM lending_records
            WHERE isbn = $1 AND retired_at IS NULL
            "#,
        )
        .bind(isbn.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_loan).transpose()
    }

    async fn list_available(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT b.isbn, b.title, b.author
            FROM books b
            LEFT JOIN lending_records lr
                ON lr.isbn = b.isbn AND lr.retired_at IS NULL
            WHERE b.retired_at IS NULL
              AND lr.loan_id IS NULL
            ORDER BY b.isbn ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Book> {
                Ok(Book {
                    isbn: isbn_column(row, "isbn")?,
                    title: row.try_get("title")?,
                    author: row.try_get("author")?,
                    lifecycle: Lifecycle::Active,
                })
            })
            .collect()
    }

    async fn loans_for_user(&self, user_id: UserId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT loan_id, user_id, isbn, loaned_at, retired_at
            FROM lending_records
            WHERE user_id = $1
            ORDER BY loaned_at ASC, loan_id ASC
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_loan).collect()
    }
}
