use crate::domain::{Book, Isbn, Lifecycle};
use crate::ports::{CatalogStore, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::isbn_column;

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    Ok(Book {
        isbn: isbn_column(row, "isbn")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        lifecycle: Lifecycle::from_retired_at(row.try_get("retired_at")?),
    })
}

/// PostgreSQL implementation of `CatalogStore<Book>`
///
/// Rows are soft-deleted through `retired_at`; nothing is ever removed.
pub struct BookCatalog {
    pool: PgPool,
}

impl BookCatalog {
    /// Create a new BookCatalog with a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore<Book> for BookCatalog {
    async fn check_retired(&self, isbn: Isbn) -> Result<bool> {
        let retired: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM books WHERE isbn = $1 AND retired_at IS NOT NULL
            )
            "#,
        )
        .bind(isbn.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(retired)
    }

    /// Insert a new book
    ///
    /// A primary key violation surfaces as `StoreError::Conflict`.
    async fn register(&self, book: &Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (isbn, title, author)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(book.isbn.value())
        .bind(&book.title)
        .bind(&book.author)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Bring a retired book back as available
    ///
    /// A loan left open when the book was retired is closed in the same
    /// statement. Its lending record is kept.
    async fn unretire(&self, isbn: Isbn) -> Result<()> {
        sqlx::query(
            r#"
            WITH closed AS (
                UPDATE lending_records
                SET retired_at = now()
                WHERE isbn = $1 AND retired_at IS NULL
            )
            UPDATE books
            SET retired_at = NULL
            WHERE isbn = $1
            "#,
        )
        .bind(isbn.value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn retire(&self, isbn: Isbn) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET retired_at = now()
            WHERE isbn = $1 AND retired_at IS NULL
            "#,
        )
        .bind(isbn.value())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn fetch(&self, isbn: Isbn) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT isbn, title, author, retired_at
            FROM books
            WHERE isbn = $1 AND retired_at IS NULL
            "#,
        )
        .bind(isbn.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn list_active(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT isbn, title, author, retired_at
            FROM books
            WHERE retired_at IS NULL
            ORDER BY isbn ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }
}
