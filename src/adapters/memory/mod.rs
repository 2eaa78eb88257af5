//! In-memory storage backend.
//!
//! Used by the service and HTTP tests, and selectable at runtime with
//! `STORAGE_BACKEND=memory` for running without PostgreSQL. All three ports
//! share one mutex-guarded state, so every port call is atomic with respect
//! to every other one.

mod catalog;
mod ledger;

use crate::domain::{Book, Isbn, Loan, User, UserId};
use crate::ports::StoreError;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub(crate) struct LibraryState {
    books: BTreeMap<Isbn, Book>,
    users: BTreeMap<UserId, User>,
    /// Lending records in insertion order (never removed).
    loans: Vec<Loan>,
}

impl LibraryState {
    fn has_active_loan_for_book(&self, isbn: Isbn) -> bool {
        self.loans
            .iter()
            .any(|loan| loan.isbn == isbn && loan.state.is_active())
    }

    fn has_active_loan_for_user(&self, user_id: UserId) -> bool {
        self.loans
            .iter()
            .any(|loan| loan.user_id == user_id && loan.state.is_active())
    }
}

/// In-memory implementation of `CatalogStore<Book>`, `CatalogStore<User>`
/// and `LendingLedger`.
///
/// Counts every port call so tests can assert that rejected input never
/// reached the store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<LibraryState>,
    interactions: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of port calls made so far.
    pub fn interaction_count(&self) -> usize {
        self.interactions.load(Ordering::SeqCst)
    }

    /// Number of lending records ever created (active and returned).
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn loan_record_count(&self) -> usize {
        self.state
            .lock()
            .expect("in-memory store lock poisoned")
            .loans
            .len()
    }

    /// Number of rows in the books table, retired ones included.
    ///
    /// # Panics
    ///
    /// Panics if the store lock is poisoned.
    pub fn book_row_count(&self) -> usize {
        self.state
            .lock()
            .expect("in-memory store lock poisoned")
            .books
            .len()
    }

    fn lock(&self) -> Result<MutexGuard<'_, LibraryState>, StoreError> {
        self.interactions.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".into()))
    }
}
