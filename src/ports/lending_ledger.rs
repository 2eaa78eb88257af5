use crate::domain::{Book, Isbn, Loan, UserId};
use async_trait::async_trait;

use super::store_error::Result;

/// 貸出台帳ポート
///
/// 「1冊につき有効な貸出は1件まで」という不変条件を保持する。
#[async_trait]
pub trait LendingLedger: Send + Sync {
    /// 書籍が貸出可能か確認する
    ///
    /// 有効な書籍が存在し、かつ有効な貸出記録が無い場合にtrue。
    async fn is_book_available(&self, isbn: Isbn) -> Result<bool>;

    /// 貸出記録を作成する
    ///
    /// 1文で条件付きINSERTを行う（確認と挿入の間の競合を許さない）。
    /// - 会員または書籍が有効でない場合は`Ok(None)`
    /// - 同じISBNの有効な貸出が既にある場合は`StoreError::Conflict`
    async fn create_loan(&self, user_id: UserId, isbn: Isbn) -> Result<Option<Loan>>;

    /// 有効な貸出記録を返却済みにする
    ///
    /// 影響を受けた行数を返す。0は「貸出中ではない」を意味する。
    async fn close_loan(&self, isbn: Isbn) -> Result<u64>;

    /// 書籍の有効な貸出記録を取得する
    async fn active_loan(&self, isbn: Isbn) -> Result<Option<Loan>>;

    /// 貸出可能な書籍の一覧（ISBN昇順）
    async fn list_available(&self) -> Result<Vec<Book>>;

    /// 会員の貸出履歴（返却済みを含む、貸出日時の昇順）
    async fn loans_for_user(&self, user_id: UserId) -> Result<Vec<Loan>>;
}
