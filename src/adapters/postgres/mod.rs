pub mod book_catalog;
pub mod lending_ledger;
pub mod user_roster;

use crate::domain::{IdError, Isbn, Loan, LoanId, LoanState, UserId};
use crate::ports::StoreError;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::time::Duration;

// パブリックに型を再エクスポート
pub use book_catalog::BookCatalog as PostgresBookCatalog;
pub use lending_ledger::LendingLedger as PostgresLendingLedger;
pub use user_roster::UserRoster as PostgresUserRoster;

/// Classify driver errors.
///
/// Unique violations (SQLSTATE 23505) become `StoreError::Conflict`:
/// the primary keys on `books`/`users` and the partial unique index on
/// active lending records are the only unique constraints in the schema.
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict;
            }
        }
        StoreError::Backend(Box::new(err))
    }
}

/// Create a PostgreSQL connection pool
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

/// Apply the migrations under `./migrations`
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

fn invalid_data(column: &str, value: i32, err: IdError) -> StoreError {
    StoreError::Backend(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("{column} out of range: {value} ({err})"),
    )))
}

fn isbn_column(row: &PgRow, column: &str) -> Result<Isbn, StoreError> {
    let value: i32 = row.try_get(column)?;
    Isbn::parse(i64::from(value)).map_err(|e| invalid_data(column, value, e))
}

fn user_id_column(row: &PgRow, column: &str) -> Result<UserId, StoreError> {
    let value: i32 = row.try_get(column)?;
    UserId::parse(i64::from(value)).map_err(|e| invalid_data(column, value, e))
}

/// PostgreSQLの行データをLoanに変換する
///
/// 期待する列: loan_id, user_id, isbn, loaned_at, retired_at
fn map_row_to_loan(row: &PgRow) -> Result<Loan, StoreError> {
    let retired_at: Option<DateTime<Utc>> = row.try_get("retired_at")?;

    Ok(Loan {
        loan_id: LoanId::from_uuid(row.try_get("loan_id")?),
        isbn: isbn_column(row, "isbn")?,
        user_id: user_id_column(row, "user_id")?,
        loaned_at: row.try_get("loaned_at")?,
        state: LoanState::from_retired_at(retired_at),
    })
}
