use crate::domain::{
    Loan,
    commands::{BorrowBook, ReturnBook},
};
use crate::ports::StoreError;

use super::errors::*;
use super::service::{ServiceDependencies, require_isbn, require_user_id};

/// 書籍を貸し出す
///
/// 検証の順序は固定で、各段階で失敗したら以降は実行しない：
/// 1. ISBN・会員IDが入力されていること（両方無い場合はまとめて報告）
/// 2. ISBNの書式
/// 3. 会員IDの書式
/// 4. 書籍が貸出可能であること
/// 5. 貸出記録の作成
///
/// 1〜3で失敗した場合、ストアには一切アクセスしない。
///
/// # 一貫性保証
///
/// 5は台帳側で1文の条件付きINSERTとして実行されるため、4と5の間に
/// 他のリクエストが同じ書籍を貸し出した場合も有効な貸出は1件に保たれる。
/// その場合は4で失敗した場合と同じ`NotFound`を返す。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<Loan> {
    // 1. 必須項目の確認
    match (cmd.isbn == 0, cmd.user_id == 0) {
        (true, true) => return Err(LendingError::MissingField(ISBN_AND_USER_ID_MISSING)),
        (true, false) => return Err(LendingError::MissingField(ISBN_MISSING)),
        (false, true) => return Err(LendingError::MissingField(USER_ID_MISSING)),
        (false, false) => {}
    }

    // 2. ISBNの書式確認
    let isbn = require_isbn(cmd.isbn)?;

    // 3. 会員IDの書式確認
    let user_id = require_user_id(cmd.user_id)?;

    // 4. 書籍の貸出可能性確認
    let available = deps
        .ledger
        .is_book_available(isbn)
        .await
        .map_err(LendingError::store("check book availability"))?;

    if !available {
        return Err(LendingError::NotFound(BOOK_UNAVAILABLE));
    }

    // 5. 貸出記録の作成
    let created = match deps.ledger.create_loan(user_id, isbn).await {
        Ok(created) => created,
        Err(StoreError::Conflict) => return Err(LendingError::NotFound(BOOK_UNAVAILABLE)),
        Err(e) => return Err(LendingError::store("create loan")(e)),
    };

    match created {
        Some(loan) => {
            tracing::info!(%isbn, %user_id, loan_id = %loan.loan_id.value(), "book borrowed");
            Ok(loan)
        }
        // 会員または書籍が有効でなかった。どちらかを判別する
        None => {
            let user = deps
                .users
                .fetch(user_id)
                .await
                .map_err(LendingError::store("fetch user"))?;
            match user {
                None => Err(LendingError::NotFound(USER_DOES_NOT_EXIST)),
                Some(_) => Err(LendingError::NotFound(BOOK_UNAVAILABLE)),
            }
        }
    }
}

/// 書籍を返却する
///
/// 1. ISBNの書式確認
/// 2. 有効な貸出記録を返却済みにする
/// 3. 該当が0件なら、書籍自体が無いのか貸出されていないのかをカタログで判別する
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<()> {
    // 1. ISBNの書式確認
    let isbn = require_isbn(cmd.isbn)?;

    // 2. 貸出記録を返却済みにする
    let affected = deps
        .ledger
        .close_loan(isbn)
        .await
        .map_err(LendingError::store("close loan"))?;

    if affected > 0 {
        tracing::info!(%isbn, "book returned");
        return Ok(());
    }

    // 3. 失敗理由の判別
    let book = deps
        .books
        .fetch(isbn)
        .await
        .map_err(LendingError::store("fetch book"))?;

    match book {
        None => Err(LendingError::NotFound(BOOK_DOES_NOT_EXIST)),
        Some(_) => Err(LendingError::NotFound(BOOK_NOT_BORROWED)),
    }
}
