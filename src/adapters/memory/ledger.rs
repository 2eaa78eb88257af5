use crate::domain::{
    Book, Isbn, Loan, UserId,
    loan::{close_loan, open_loan},
};
use crate::ports::{LendingLedger, Result, StoreError};
use async_trait::async_trait;
use chrono::Utc;

use super::InMemoryStore;

#[async_trait]
impl LendingLedger for InMemoryStore {
    async fn is_book_available(&self, isbn: Isbn) -> Result<bool> {
        let state = self.lock()?;
        let active_book = state
            .books
            .get(&isbn)
            .is_some_and(|book| book.lifecycle.is_active());
        Ok(active_book && !state.has_active_loan_for_book(isbn))
    }

    /// Check-and-insert under the store lock, mirroring the single
    /// conditional INSERT of the PostgreSQL adapter.
    async fn create_loan(&self, user_id: UserId, isbn: Isbn) -> Result<Option<Loan>> {
        let mut state = self.lock()?;

        let user_active = state
            .users
            .get(&user_id)
            .is_some_and(|user| user.lifecycle.is_active());
        let book_active = state
            .books
            .get(&isbn)
            .is_some_and(|book| book.lifecycle.is_active());
        if !user_active || !book_active {
            return Ok(None);
        }
        if state.has_active_loan_for_book(isbn) {
            return Err(StoreError::Conflict);
        }

        let loan = open_loan(user_id, isbn, Utc::now());
        state.loans.push(loan.clone());
        Ok(Some(loan))
    }

    async fn close_loan(&self, isbn: Isbn) -> Result<u64> {
        let mut state = self.lock()?;
        let now = Utc::now();

        let Some(slot) = state
            .loans
            .iter_mut()
            .find(|loan| loan.isbn == isbn && loan.state.is_active())
        else {
            return Ok(0);
        };

        match close_loan(slot.clone(), now) {
            Ok(closed) => {
                *slot = closed;
                Ok(1)
            }
            Err(_) => Ok(0),
        }
    }

    async fn active_loan(&self, isbn: Isbn) -> Result<Option<Loan>> {
        let state = self.lock()?;
        Ok(state
            .loans
            .iter()
            .find(|loan| loan.isbn == isbn && loan.state.is_active())
            .cloned())
    }

    async fn list_available(&self) -> Result<Vec<Book>> {
        let state = self.lock()?;
        Ok(state
            .books
            .values()
            .filter(|book| book.lifecycle.is_active())
            .filter(|book| !state.has_active_loan_for_book(book.isbn))
            .cloned()
            .collect())
    }

    async fn loans_for_user(&self, user_id: UserId) -> Result<Vec<Loan>> {
        let state = self.lock()?;
        Ok(state
            .loans
            .iter()
            .filter(|loan| loan.user_id == user_id)
            .cloned()
            .collect())
    }
}
