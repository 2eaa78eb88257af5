use crate::domain::{
    Book, Isbn,
    commands::RegisterBook,
    loan::{BookState, CatalogStatus, derive_book_state},
    validator,
};

use super::errors::*;
use super::service::{Registration, ServiceDependencies, add_or_resurrect, require_isbn};

/// 書籍を登録する（退役済みなら復活させる）
///
/// ビジネスルール：
/// - ISBNが0でないこと（`MissingField`）
/// - ISBNが5桁であること（`InvalidFormat`）
/// - 退役済みの同じISBNがあれば新規追加せず復活させる
/// - 新規追加時はタイトル・著者が空でないこと（`MissingField`）
/// - 有効な同じISBNがあれば`AlreadyExists`
pub async fn register_book(deps: &ServiceDependencies, cmd: RegisterBook) -> Result<Registration> {
    // 1. 必須項目の確認
    if !validator::has_required_book_fields(cmd.isbn, &cmd.title, &cmd.author) {
        return Err(LendingError::MissingField(BOOK_DETAILS_REQUIRED));
    }

    // 2. ISBNの書式確認
    let isbn = require_isbn(cmd.isbn)?;

    // 3. 登録または復活
    let book = Book::new(isbn, cmd.title, cmd.author);
    let registration = add_or_resurrect(
        deps.books.as_ref(),
        book,
        |book| {
            if book.title.trim().is_empty() || book.author.trim().is_empty() {
                return Err(LendingError::MissingField(BOOK_TITLE_AND_AUTHOR_REQUIRED));
            }
            Ok(())
        },
        BOOK_ALREADY_EXISTS,
    )
    .await?;

    tracing::info!(%isbn, ?registration, "book registered");
    Ok(registration)
}

/// 書籍を退役させる（論理削除）
///
/// 貸出中の書籍も退役できる。貸出記録はそのまま残る。
pub async fn retire_book(deps: &ServiceDependencies, isbn: i64) -> Result<()> {
    let isbn = require_isbn(isbn)?;

    let affected = deps
        .books
        .retire(isbn)
        .await
        .map_err(LendingError::store("retire book"))?;

    if affected == 0 {
        return Err(LendingError::NotFound(BOOK_DOES_NOT_EXIST));
    }

    tracing::info!(%isbn, "book retired");
    Ok(())
}

/// 有効な書籍を取得する
pub async fn get_book(deps: &ServiceDependencies, isbn: i64) -> Result<Book> {
    let isbn = require_isbn(isbn)?;

    deps.books
        .fetch(isbn)
        .await
        .map_err(LendingError::store("fetch book"))?
        .ok_or(LendingError::NotFound(BOOK_DOES_NOT_EXIST))
}

/// 有効な書籍の一覧
///
/// 0件は空の一覧として成功を返す。
pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.books
        .list_active()
        .await
        .map_err(LendingError::store("list books"))
}

/// 貸出可能な書籍の一覧
///
/// 0件は空の一覧として成功を返す。
pub async fn list_available_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.ledger
        .list_available()
        .await
        .map_err(LendingError::store("list available books"))
}

/// 書籍の現在の状態を導出する
pub async fn book_state(deps: &ServiceDependencies, isbn: i64) -> Result<BookState> {
    let isbn = require_isbn(isbn)?;
    let catalog = catalog_status(deps, isbn).await?;

    let has_active_loan = deps
        .ledger
        .active_loan(isbn)
        .await
        .map_err(LendingError::store("fetch active loan"))?
        .is_some();

    Ok(derive_book_state(catalog, has_active_loan))
}

async fn catalog_status(deps: &ServiceDependencies, isbn: Isbn) -> Result<CatalogStatus> {
    let active = deps
        .books
        .fetch(isbn)
        .await
        .map_err(LendingError::store("fetch book"))?;
    if active.is_some() {
        return Ok(CatalogStatus::Active);
    }

    let retired = deps
        .books
        .check_retired(isbn)
        .await
        .map_err(LendingError::store("check retired"))?;

    Ok(if retired {
        CatalogStatus::Retired
    } else {
        CatalogStatus::Unregistered
    })
}
