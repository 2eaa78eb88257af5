use library_lending::application::lending::*;
use library_lending::domain::{
    BookState, LoanState,
    commands::{BorrowBook, RegisterBook, RegisterUser, ReturnBook},
};

mod common;

fn borrow(user_id: i64, isbn: i64) -> BorrowBook {
    BorrowBook { user_id, isbn }
}

fn book(isbn: i64, title: &str, author: &str) -> RegisterBook {
    RegisterBook {
        isbn,
        title: title.to_string(),
        author: author.to_string(),
    }
}

// ============================================================================
// 書籍の登録・取得・退役
// ============================================================================

#[tokio::test]
async fn test_register_then_fetch_round_trips() {
    let (_store, deps) = common::memory_deps();

    let registration = register_book(&deps, book(12345, "Dune", "Frank Herbert"))
        .await
        .unwrap();
    assert_eq!(registration, Registration::Created);

    let fetched = get_book(&deps, 12345).await.unwrap();
    assert_eq!(fetched.isbn.value(), 12345);
    assert_eq!(fetched.title, "Dune");
    assert_eq!(fetched.author, "Frank Herbert");
    assert_eq!(book_state(&deps, 12345).await.unwrap(), BookState::Available);
}

#[tokio::test]
async fn test_register_twice_already_exists() {
    let (_store, deps) = common::memory_deps();
    register_book(&deps, book(12345, "Dune", "Frank Herbert"))
        .await
        .unwrap();

    let err = register_book(&deps, book(12345, "Dune", "Frank Herbert"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(err.message(), BOOK_ALREADY_EXISTS);
}

#[tokio::test]
async fn test_register_empty_book_missing_field() {
    let (store, deps) = common::memory_deps();

    let err = register_book(&deps, book(0, "", "")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingField);
    assert_eq!(err.message(), BOOK_DETAILS_REQUIRED);
    assert_eq!(store.interaction_count(), 0);
}

#[tokio::test]
async fn test_register_malformed_isbn() {
    let (_store, deps) = common::memory_deps();

    let err = register_book(&deps, book(123, "T", "A")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert_eq!(err.message(), INVALID_ISBN);
}

#[tokio::test]
async fn test_register_blank_title_missing_field() {
    let (store, deps) = common::memory_deps();

    let err = register_book(&deps, book(12345, " ", "A")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MissingField);
    assert_eq!(err.message(), BOOK_TITLE_AND_AUTHOR_REQUIRED);
    assert_eq!(store.book_row_count(), 0);
}

#[tokio::test]
async fn test_retire_then_register_resurrects_single_row() {
    let (store, deps) = common::memory_deps();
    register_book(&deps, book(12345, "Dune", "Frank Herbert"))
        .await
        .unwrap();

    retire_book(&deps, 12345).await.unwrap();
    assert_eq!(book_state(&deps, 12345).await.unwrap(), BookState::Retired);
    assert_eq!(get_book(&deps, 12345).await.unwrap_err().kind(), ErrorKind::NotFound);

    let registration = register_book(&deps, book(12345, "Ignored", "Ignored"))
        .await
        .unwrap();

    assert_eq!(registration, Registration::Resurrected);
    assert_eq!(book_state(&deps, 12345).await.unwrap(), BookState::Available);
    assert_eq!(store.book_row_count(), 1);
    // 復活時は元の属性を保持する
    assert_eq!(get_book(&deps, 12345).await.unwrap().title, "Dune");
}

#[tokio::test]
async fn test_retire_unknown_book_not_found() {
    let (_store, deps) = common::memory_deps();

    let err = retire_book(&deps, 12345).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), BOOK_DOES_NOT_EXIST);

    let err = retire_book(&deps, 99).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
}

#[tokio::test]
async fn test_empty_listings_are_success() {
    let (_store, deps) = common::memory_deps();

    assert!(list_books(&deps).await.unwrap().is_empty());
    assert!(list_available_books(&deps).await.unwrap().is_empty());
    assert!(list_users(&deps).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unregistered_book_state() {
    let (_store, deps) = common::memory_deps();
    assert_eq!(book_state(&deps, 12345).await.unwrap(), BookState::Unregistered);
}

// ============================================================================
// 貸出・返却
// ============================================================================

#[tokio::test]
async fn test_borrow_return_scenario() {
    let (store, deps) = common::memory_deps();
    common::seed(&deps, &[12345], &[1001, 1002]).await;

    let loan = borrow_book(&deps, borrow(1001, 12345)).await.unwrap();
    assert_eq!(loan.user_id.value(), 1001);
    assert_eq!(book_state(&deps, 12345).await.unwrap(), BookState::OnLoan);

    let err = borrow_book(&deps, borrow(1002, 12345)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), BOOK_UNAVAILABLE);

    return_book(&deps, ReturnBook { isbn: 12345 }).await.unwrap();
    assert_eq!(book_state(&deps, 12345).await.unwrap(), BookState::Available);

    let loan = borrow_book(&deps, borrow(1002, 12345)).await.unwrap();
    assert_eq!(loan.user_id.value(), 1002);
    assert_eq!(store.loan_record_count(), 2);
}

#[tokio::test]
async fn test_borrow_missing_fields() {
    let (store, deps) = common::memory_deps();

    let cases = [
        (borrow(0, 0), ISBN_AND_USER_ID_MISSING),
        (borrow(1001, 0), ISBN_MISSING),
        (borrow(0, 12345), USER_ID_MISSING),
    ];
    for (cmd, expected) in cases {
        let err = borrow_book(&deps, cmd).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingField);
        assert_eq!(err.message(), expected);
    }
    assert_eq!(store.interaction_count(), 0);
}

#[tokio::test]
async fn test_borrow_malformed_isbn_never_touches_store() {
    let (store, deps) = common::memory_deps();

    let err = borrow_book(&deps, borrow(1001, 123)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert_eq!(err.message(), INVALID_ISBN);
    assert_eq!(store.interaction_count(), 0);
}

#[tokio::test]
async fn test_borrow_checks_isbn_format_before_user_id() {
    let (store, deps) = common::memory_deps();

    let err = borrow_book(&deps, borrow(12, 123)).await.unwrap_err();
    assert_eq!(err.message(), INVALID_ISBN);

    let err = borrow_book(&deps, borrow(12, 12345)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert_eq!(err.message(), INVALID_USER_ID);
    assert_eq!(store.interaction_count(), 0);
}

#[tokio::test]
async fn test_borrow_unknown_user() {
    let (store, deps) = common::memory_deps();
    common::seed(&deps, &[12345], &[]).await;

    let err = borrow_book(&deps, borrow(1001, 12345)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), USER_DOES_NOT_EXIST);
    assert_eq!(store.loan_record_count(), 0);
}

#[tokio::test]
async fn test_borrow_retired_book() {
    let (_store, deps) = common::memory_deps();
    common::seed(&deps, &[12345], &[1001]).await;
    retire_book(&deps, 12345).await.unwrap();

    let err = borrow_book(&deps, borrow(1001, 12345)).await.unwrap_err();
    assert_eq!(err.message(), BOOK_UNAVAILABLE);
}

#[tokio::test]
async fn test_return_never_borrowed() {
    let (_store, deps) = common::memory_deps();
    common::seed(&deps, &[12345], &[]).await;

    let err = return_book(&deps, ReturnBook { isbn: 12345 }).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), BOOK_NOT_BORROWED);
}

#[tokio::test]
async fn test_return_absent_or_retired_book() {
    let (_store, deps) = common::memory_deps();

    let err = return_book(&deps, ReturnBook { isbn: 12345 }).await.unwrap_err();
    assert_eq!(err.message(), BOOK_DOES_NOT_EXIST);

    common::seed(&deps, &[54321], &[]).await;
    retire_book(&deps, 54321).await.unwrap();
    let err = return_book(&deps, ReturnBook { isbn: 54321 }).await.unwrap_err();
    assert_eq!(err.message(), BOOK_DOES_NOT_EXIST);
}

#[tokio::test]
async fn test_return_retired_book_on_loan_succeeds() {
    let (_store, deps) = common::memory_deps();
    common::seed(&deps, &[12345], &[1001]).await;
    borrow_book(&deps, borrow(1001, 12345)).await.unwrap();

    retire_book(&deps, 12345).await.unwrap();
    assert_eq!(book_state(&deps, 12345).await.unwrap(), BookState::Retired);

    return_book(&deps, ReturnBook { isbn: 12345 }).await.unwrap();
    // 会員は書籍を返却したので退役できる
    remove_user(&deps, 1001).await.unwrap();
}

#[tokio::test]
async fn test_resurrecting_book_retired_on_loan_makes_it_available() {
    let (store, deps) = common::memory_deps();
    common::seed(&deps, &[12345], &[1001, 1002]).await;
    borrow_book(&deps, borrow(1001, 12345)).await.unwrap();
    retire_book(&deps, 12345).await.unwrap();

    let registration = register_book(&deps, book(12345, "Dune", "Frank Herbert"))
        .await
        .unwrap();

    assert_eq!(registration, Registration::Resurrected);
    assert_eq!(book_state(&deps, 12345).await.unwrap(), BookState::Available);

    // 以前の借り手は書籍を保持していないので退役でき、別の会員が借りられる
    remove_user(&deps, 1001).await.unwrap();
    let loan = borrow_book(&deps, borrow(1002, 12345)).await.unwrap();
    assert_eq!(loan.user_id.value(), 1002);

    // 閉じた貸出記録は履歴として残る
    assert_eq!(store.loan_record_count(), 2);
}

#[tokio::test]
async fn test_list_available_excludes_loaned_books() {
    let (_store, deps) = common::memory_deps();
    common::seed(&deps, &[12345, 54321], &[1001]).await;
    borrow_book(&deps, borrow(1001, 12345)).await.unwrap();

    let available: Vec<i32> = list_available_books(&deps)
        .await
        .unwrap()
        .iter()
        .map(|b| b.isbn.value())
        .collect();
    assert_eq!(available, vec![54321]);
    assert_eq!(list_books(&deps).await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_borrows_create_one_loan() {
    let (store, deps) = common::memory_deps();
    let user_ids: Vec<i64> = (1001..=1008).collect();
    common::seed(&deps, &[12345], &user_ids).await;

    let handles = user_ids.into_iter().map(|user_id| {
        let deps = deps.clone();
        tokio::spawn(async move { borrow_book(&deps, borrow(user_id, 12345)).await })
    });
    let results = futures::future::join_all(handles).await;

    let mut successes = 0;
    for result in results {
        match result.unwrap() {
            Ok(_) => successes += 1,
            Err(err) => assert_eq!(err.message(), BOOK_UNAVAILABLE),
        }
    }
    assert_eq!(successes, 1);
    assert_eq!(store.loan_record_count(), 1);
}

// ============================================================================
// 会員
// ============================================================================

#[tokio::test]
async fn test_register_user_validation() {
    let (_store, deps) = common::memory_deps();

    let err = register_user(
        &deps,
        RegisterUser {
            id: 0,
            name: "Ann".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);
    assert_eq!(err.message(), USER_DETAILS_REQUIRED);

    let err = register_user(
        &deps,
        RegisterUser {
            id: 10001,
            name: "Ann".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);

    let err = register_user(
        &deps,
        RegisterUser {
            id: 1001,
            name: "".into(),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.message(), USER_NAME_REQUIRED);
}

#[tokio::test]
async fn test_remove_user_with_active_loan_cannot_remove() {
    let (_store, deps) = common::memory_deps();
    common::seed(&deps, &[12345], &[1001]).await;
    borrow_book(&deps, borrow(1001, 12345)).await.unwrap();

    let err = remove_user(&deps, 1001).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CannotRemove);
    assert_eq!(err.message(), USER_HOLDS_BOOK);
    assert_eq!(err.status_class(), StatusClass::Conflict);
    assert!(get_user(&deps, 1001).await.is_ok());
}

#[tokio::test]
async fn test_remove_then_register_user_resurrects() {
    let (_store, deps) = common::memory_deps();
    common::seed(&deps, &[], &[1001]).await;

    remove_user(&deps, 1001).await.unwrap();
    assert_eq!(get_user(&deps, 1001).await.unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(remove_user(&deps, 1001).await.unwrap_err().kind(), ErrorKind::NotFound);

    let registration = register_user(
        &deps,
        RegisterUser {
            id: 1001,
            name: "Someone Else".into(),
        },
    )
    .await
    .unwrap();

    assert_eq!(registration, Registration::Resurrected);
    assert_eq!(get_user(&deps, 1001).await.unwrap().name, "User 1001");
    assert_eq!(list_users(&deps).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_loans_keeps_history() {
    let (_store, deps) = common::memory_deps();
    common::seed(&deps, &[12345, 54321], &[1001]).await;

    borrow_book(&deps, borrow(1001, 12345)).await.unwrap();
    return_book(&deps, ReturnBook { isbn: 12345 }).await.unwrap();
    borrow_book(&deps, borrow(1001, 54321)).await.unwrap();

    let loans = user_loans(&deps, 1001).await.unwrap();
    assert_eq!(loans.len(), 2);
    assert!(matches!(loans[0].state, LoanState::Returned { .. }));
    assert_eq!(loans[1].state, LoanState::Active);

    let err = user_loans(&deps, 9999).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
