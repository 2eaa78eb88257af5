use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Isbn, LoanId, UserId};

// ============================================================================
// 貸出記録
// ============================================================================

/// 貸出記録の状態
///
/// 返却済みの記録は削除せず履歴として残す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoanState {
    Active,
    Returned { returned_at: DateTime<Utc> },
}

impl LoanState {
    /// `retired_at`列の値から復元する
    pub fn from_retired_at(retired_at: Option<DateTime<Utc>>) -> Self {
        match retired_at {
            Some(returned_at) => LoanState::Returned { returned_at },
            None => LoanState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LoanState::Active)
    }
}

/// 貸出記録 - 1冊の書籍の1回の貸出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub isbn: Isbn,
    pub user_id: UserId,
    pub loaned_at: DateTime<Utc>,
    pub state: LoanState,
}

/// 返却のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnBookError {
    /// 既に返却済み
    AlreadyReturned,
}

/// 純粋関数：貸出記録を作成する
///
/// 書籍・会員の存在確認は呼び出し側（台帳）の責務。
pub fn open_loan(user_id: UserId, isbn: Isbn, loaned_at: DateTime<Utc>) -> Loan {
    Loan {
        loan_id: LoanId::new(),
        isbn,
        user_id,
        loaned_at,
        state: LoanState::Active,
    }
}

/// 純粋関数：貸出記録を返却済みにする
pub fn close_loan(loan: Loan, returned_at: DateTime<Utc>) -> Result<Loan, ReturnBookError> {
    if !loan.state.is_active() {
        return Err(ReturnBookError::AlreadyReturned);
    }
    Ok(Loan {
        state: LoanState::Returned { returned_at },
        ..loan
    })
}

// ============================================================================
// 書籍の貸出状態（導出値、永続化しない）
// ============================================================================

/// カタログ上の書籍の有無
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogStatus {
    Unregistered,
    Retired,
    Active,
}

/// 書籍の状態
///
/// ```text
/// Unregistered --register--> Available --borrow--> OnLoan
///                  Retired --register--> Available <--return--
/// Available / OnLoan --retire--> Retired
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookState {
    Unregistered,
    Retired,
    Available,
    OnLoan,
}

/// 純粋関数：カタログの状態と有効な貸出の有無から書籍の状態を導出する
///
/// 退役済みの書籍は貸出中でも`Retired`として扱う。
pub fn derive_book_state(catalog: CatalogStatus, has_active_loan: bool) -> BookState {
    match (catalog, has_active_loan) {
        (CatalogStatus::Unregistered, _) => BookState::Unregistered,
        (CatalogStatus::Retired, _) => BookState::Retired,
        (CatalogStatus::Active, true) => BookState::OnLoan,
        (CatalogStatus::Active, false) => BookState::Available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (UserId, Isbn) {
        (UserId::parse(1001).unwrap(), Isbn::parse(12345).unwrap())
    }

    #[test]
    fn test_open_loan_is_active() {
        let (user_id, isbn) = ids();
        let now = Utc::now();
        let loan = open_loan(user_id, isbn, now);

        assert_eq!(loan.user_id, user_id);
        assert_eq!(loan.isbn, isbn);
        assert_eq!(loan.loaned_at, now);
        assert!(loan.state.is_active());
    }

    #[test]
    fn test_close_loan_success() {
        let (user_id, isbn) = ids();
        let now = Utc::now();
        let loan = open_loan(user_id, isbn, now);
        let returned_at = now + chrono::Duration::days(3);

        let closed = close_loan(loan.clone(), returned_at).unwrap();
        assert_eq!(closed.loan_id, loan.loan_id);
        assert_eq!(closed.state, LoanState::Returned { returned_at });
    }

    #[test]
    fn test_close_loan_fails_when_already_returned() {
        let (user_id, isbn) = ids();
        let now = Utc::now();
        let closed = close_loan(open_loan(user_id, isbn, now), now).unwrap();

        assert_eq!(close_loan(closed, now), Err(ReturnBookError::AlreadyReturned));
    }

    #[test]
    fn test_loan_state_from_retired_at() {
        let now = Utc::now();
        assert_eq!(LoanState::from_retired_at(None), LoanState::Active);
        assert_eq!(
            LoanState::from_retired_at(Some(now)),
            LoanState::Returned { returned_at: now }
        );
    }

    #[test]
    fn test_derive_book_state() {
        assert_eq!(
            derive_book_state(CatalogStatus::Unregistered, false),
            BookState::Unregistered
        );
        assert_eq!(derive_book_state(CatalogStatus::Retired, true), BookState::Retired);
        assert_eq!(derive_book_state(CatalogStatus::Active, false), BookState::Available);
        assert_eq!(derive_book_state(CatalogStatus::Active, true), BookState::OnLoan);
    }
}
