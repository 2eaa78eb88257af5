use crate::domain::{
    Book, CatalogEntity, User,
    catalog::{AlreadyRetired, resurrect, retire},
    loan::close_loan,
};
use crate::ports::{CatalogStore, Result, StoreError};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;

use super::{InMemoryStore, LibraryState};

/// Selects the table an entity lives in.
pub(crate) trait Table: CatalogEntity {
    fn rows(state: &LibraryState) -> &BTreeMap<Self::Key, Self>;

    fn rows_mut(state: &mut LibraryState) -> &mut BTreeMap<Self::Key, Self>;

    /// Whether an active lending record blocks retiring this row.
    fn is_referenced(_state: &LibraryState, _key: Self::Key) -> bool {
        false
    }

    /// Runs under the same lock as the unretire itself.
    fn on_unretire(_state: &mut LibraryState, _key: Self::Key) {}
}

impl Table for Book {
    fn rows(state: &LibraryState) -> &BTreeMap<Self::Key, Self> {
        &state.books
    }

    fn rows_mut(state: &mut LibraryState) -> &mut BTreeMap<Self::Key, Self> {
        &mut state.books
    }

    /// A resurrected book comes back available: a loan left open when it
    /// was retired is closed, and its record stays in the history.
    fn on_unretire(state: &mut LibraryState, isbn: Self::Key) {
        let now = Utc::now();
        for slot in state
            .loans
            .iter_mut()
            .filter(|loan| loan.isbn == isbn && loan.state.is_active())
        {
            if let Ok(closed) = close_loan(slot.clone(), now) {
                *slot = closed;
            }
        }
    }
}

impl Table for User {
    fn rows(state: &LibraryState) -> &BTreeMap<Self::Key, Self> {
        &state.users
    }

    fn rows_mut(state: &mut LibraryState) -> &mut BTreeMap<Self::Key, Self> {
        &mut state.users
    }

    fn is_referenced(state: &LibraryState, key: Self::Key) -> bool {
        state.has_active_loan_for_user(key)
    }
}

#[async_trait]
impl<E: Table> CatalogStore<E> for InMemoryStore {
    async fn check_retired(&self, key: E::Key) -> Result<bool> {
        let state = self.lock()?;
        Ok(E::rows(&state)
            .get(&key)
            .is_some_and(|row| row.lifecycle().is_retired()))
    }

    async fn register(&self, entity: &E) -> Result<()> {
        let mut state = self.lock()?;
        let rows = E::rows_mut(&mut state);
        // Primary key semantics: any existing row conflicts.
        if rows.contains_key(&entity.key()) {
            return Err(StoreError::Conflict);
        }
        rows.insert(entity.key(), entity.clone());
        Ok(())
    }

    async fn unretire(&self, key: E::Key) -> Result<()> {
        let mut state = self.lock()?;
        let rows = E::rows_mut(&mut state);
        if let Some(row) = rows.get(&key).cloned() {
            rows.insert(key, resurrect(row));
            E::on_unretire(&mut state, key);
        }
        Ok(())
    }

    async fn retire(&self, key: E::Key) -> Result<u64> {
        let mut state = self.lock()?;

        let Some(row) = E::rows(&state).get(&key).cloned() else {
            return Ok(0);
        };
        if row.lifecycle().is_active() && E::is_referenced(&state, key) {
            return Err(StoreError::Referenced);
        }

        match retire(row, Utc::now()) {
            Ok(retired) => {
                E::rows_mut(&mut state).insert(key, retired);
                Ok(1)
            }
            Err(AlreadyRetired) => Ok(0),
        }
    }

    async fn fetch(&self, key: E::Key) -> Result<Option<E>> {
        let state = self.lock()?;
        Ok(E::rows(&state)
            .get(&key)
            .filter(|row| row.lifecycle().is_active())
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<E>> {
        let state = self.lock()?;
        Ok(E::rows(&state)
            .values()
            .filter(|row| row.lifecycle().is_active())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Isbn, UserId};
    use crate::ports::LendingLedger;

    fn isbn(raw: i64) -> Isbn {
        Isbn::parse(raw).unwrap()
    }

    fn user_id(raw: i64) -> UserId {
        UserId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_fetch_book() {
        let store = InMemoryStore::new();
        let book = Book::new(isbn(12345), "T", "A");

        CatalogStore::<Book>::register(&store, &book).await.unwrap();

        let fetched = CatalogStore::<Book>::fetch(&store, isbn(12345)).await.unwrap();
        assert_eq!(fetched, Some(book));
    }

    #[tokio::test]
    async fn test_register_conflicts_on_existing_key() {
        let store = InMemoryStore::new();
        let book = Book::new(isbn(12345), "T", "A");
        CatalogStore::<Book>::register(&store, &book).await.unwrap();

        let result = CatalogStore::<Book>::register(&store, &book).await;
        assert!(matches!(result, Err(StoreError::Conflict)));
    }

    #[tokio::test]
    async fn test_retire_hides_row_and_unretire_restores_it() {
        let store = InMemoryStore::new();
        let book = Book::new(isbn(12345), "T", "A");
        CatalogStore::<Book>::register(&store, &book).await.unwrap();

        assert_eq!(CatalogStore::<Book>::retire(&store, isbn(12345)).await.unwrap(), 1);
        assert!(CatalogStore::<Book>::check_retired(&store, isbn(12345)).await.unwrap());
        assert_eq!(CatalogStore::<Book>::fetch(&store, isbn(12345)).await.unwrap(), None);
        assert_eq!(CatalogStore::<Book>::retire(&store, isbn(12345)).await.unwrap(), 0);

        CatalogStore::<Book>::unretire(&store, isbn(12345)).await.unwrap();
        assert_eq!(
            CatalogStore::<Book>::fetch(&store, isbn(12345)).await.unwrap(),
            Some(book)
        );
        assert_eq!(store.book_row_count(), 1);
    }

    #[tokio::test]
    async fn test_unretire_book_closes_loan_left_open() {
        let store = InMemoryStore::new();
        CatalogStore::<User>::register(&store, &User::new(user_id(1001), "Alice"))
            .await
            .unwrap();
        CatalogStore::<Book>::register(&store, &Book::new(isbn(12345), "T", "A"))
            .await
            .unwrap();
        store.create_loan(user_id(1001), isbn(12345)).await.unwrap();
        CatalogStore::<Book>::retire(&store, isbn(12345)).await.unwrap();

        CatalogStore::<Book>::unretire(&store, isbn(12345)).await.unwrap();

        assert_eq!(store.active_loan(isbn(12345)).await.unwrap(), None);
        assert!(store.is_book_available(isbn(12345)).await.unwrap());
        assert_eq!(store.loan_record_count(), 1);
    }

    #[tokio::test]
    async fn test_retire_missing_row_affects_nothing() {
        let store = InMemoryStore::new();
        assert_eq!(CatalogStore::<User>::retire(&store, user_id(1001)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_user_with_active_loan_is_referenced() {
        let store = InMemoryStore::new();
        CatalogStore::<User>::register(&store, &User::new(user_id(1001), "Alice"))
            .await
            .unwrap();
        CatalogStore::<Book>::register(&store, &Book::new(isbn(12345), "T", "A"))
            .await
            .unwrap();
        store.create_loan(user_id(1001), isbn(12345)).await.unwrap();

        let result = CatalogStore::<User>::retire(&store, user_id(1001)).await;
        assert!(matches!(result, Err(StoreError::Referenced)));

        store.close_loan(isbn(12345)).await.unwrap();
        assert_eq!(CatalogStore::<User>::retire(&store, user_id(1001)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_active_skips_retired_rows() {
        let store = InMemoryStore::new();
        for raw in [30000, 10000, 20000] {
            CatalogStore::<Book>::register(&store, &Book::new(isbn(raw), "T", "A"))
                .await
                .unwrap();
        }
        CatalogStore::<Book>::retire(&store, isbn(20000)).await.unwrap();

        let books = CatalogStore::<Book>::list_active(&store).await.unwrap();
        let isbns: Vec<i32> = books.iter().map(|b| b.isbn.value()).collect();
        assert_eq!(isbns, vec![10000, 30000]);
    }
}
