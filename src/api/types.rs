use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    Book, BookState, Loan, LoanState, User,
    commands::{BorrowBook, RegisterBook, RegisterUser},
};

// ============================================================================
// Requests
// ============================================================================
//
// 数値項目が欠けている場合は0として扱い、アプリケーション層で
// `MissingField`として報告する。

/// POST /books
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterBookRequest {
    pub isbn: i64,
    pub title: String,
    pub author: String,
}

impl RegisterBookRequest {
    pub fn to_command(self) -> RegisterBook {
        RegisterBook {
            isbn: self.isbn,
            title: self.title,
            author: self.author,
        }
    }
}

/// POST /users
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterUserRequest {
    pub id: i64,
    pub name: String,
}

impl RegisterUserRequest {
    pub fn to_command(self) -> RegisterUser {
        RegisterUser {
            id: self.id,
            name: self.name,
        }
    }
}

/// POST /loans
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BorrowBookRequest {
    #[serde(alias = "userId", alias = "userid")]
    pub user_id: i64,
    pub isbn: i64,
}

impl BorrowBookRequest {
    pub fn to_command(&self) -> BorrowBook {
        BorrowBook {
            user_id: self.user_id,
            isbn: self.isbn,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// 書籍レスポンス
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookResponse {
    pub isbn: i32,
    pub title: String,
    pub author: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            isbn: book.isbn.value(),
            title: book.title,
            author: book.author,
        }
    }
}

/// 書籍の貸出状態（GET /books/:isbn/state）
#[derive(Debug, Serialize, Deserialize)]
pub struct BookStateResponse {
    pub isbn: i64,
    pub state: BookState,
}

/// 会員レスポンス
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.value(),
            name: user.name,
        }
    }
}

/// 貸出履歴レスポンス（GET /users/:id/loans）
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub isbn: i32,
    pub user_id: i32,
    pub loaned_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        let returned_at = match loan.state {
            LoanState::Active => None,
            LoanState::Returned { returned_at } => Some(returned_at),
        };
        Self {
            loan_id: loan.loan_id.value(),
            isbn: loan.isbn.value(),
            user_id: loan.user_id.value(),
            loaned_at: loan.loaned_at,
            returned_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookAddedResponse {
    pub message: String,
    pub isbn: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserAddedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookBorrowedResponse {
    pub message: String,
    pub isbn: i32,
    pub user_id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookReturnedResponse {
    pub message: String,
    pub isbn: i64,
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_borrow_request_accepts_user_id_spellings() {
        for body in [
            r#"{"user_id": 1001, "isbn": 12345}"#,
            r#"{"userId": 1001, "isbn": 12345}"#,
            r#"{"userid": 1001, "isbn": 12345}"#,
        ] {
            let req: BorrowBookRequest = serde_json::from_str(body).unwrap();
            assert_eq!(req.user_id, 1001);
            assert_eq!(req.isbn, 12345);
        }
    }

    #[test]
    fn test_missing_numbers_default_to_zero() {
        let req: BorrowBookRequest = serde_json::from_str("{}").unwrap();
        assert_eq!((req.user_id, req.isbn), (0, 0));

        let req: RegisterBookRequest = serde_json::from_str(r#"{"title": "T"}"#).unwrap();
        assert_eq!(req.isbn, 0);
        assert_eq!(req.author, "");
    }
}
