use crate::ports::StoreError;
use thiserror::Error;

// 利用者向けメッセージ（小文字・句読点なし、変更しないこと）
pub const BOOK_DETAILS_REQUIRED: &str = "book details required";
pub const BOOK_TITLE_AND_AUTHOR_REQUIRED: &str = "title and author are required";
pub const USER_DETAILS_REQUIRED: &str = "user details required";
pub const USER_NAME_REQUIRED: &str = "user name is required";
pub const ISBN_AND_USER_ID_MISSING: &str = "isbn and user id are missing";
pub const ISBN_MISSING: &str = "isbn is missing";
pub const USER_ID_MISSING: &str = "user id is missing";
pub const INVALID_ISBN: &str = "isbn must be exactly 5 digits";
pub const INVALID_USER_ID: &str = "user id must be exactly 4 digits";
pub const BOOK_ALREADY_EXISTS: &str = "book with this isbn already exists";
pub const USER_ALREADY_EXISTS: &str = "user with this id already exists";
pub const BOOK_DOES_NOT_EXIST: &str = "book with this isbn does not exist";
pub const BOOK_UNAVAILABLE: &str = "book with this isbn does not exist or is already borrowed";
pub const BOOK_NOT_BORROWED: &str = "book with this isbn was not borrowed";
pub const USER_DOES_NOT_EXIST: &str = "user with this id does not exist";
pub const USER_HOLDS_BOOK: &str = "user cannot be removed until borrowed books are returned";
pub const INTERNAL: &str = "internal server error";

/// エラー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingField,
    InvalidFormat,
    AlreadyExists,
    NotFound,
    CannotRemove,
    Internal,
}

impl ErrorKind {
    /// レスポンスに載せる安定したコード
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MissingField => "missing_field",
            ErrorKind::InvalidFormat => "invalid_format",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::NotFound => "not_found",
            ErrorKind::CannotRemove => "cannot_remove",
            ErrorKind::Internal => "internal",
        }
    }
}

/// トランスポート層に伝えるステータス分類
///
/// 分類はアプリケーション層だけが決める。API層はHTTPステータスへ写すだけ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    BadRequest,
    NotFound,
    Conflict,
    ServerError,
}

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LendingError {
    /// 必須の識別子・項目が無い
    #[error("{0}")]
    MissingField(&'static str),

    /// 識別子の桁数が不正
    #[error("{0}")]
    InvalidFormat(&'static str),

    /// 有効な行と登録が衝突した
    #[error("{0}")]
    AlreadyExists(&'static str),

    /// 対象が存在しない、または期待した状態にない
    #[error("{0}")]
    NotFound(&'static str),

    /// 参照ルールにより削除できない
    #[error("{0}")]
    CannotRemove(&'static str),

    /// ストア層の分類されないエラー
    #[error("{operation} failed")]
    Internal {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl LendingError {
    /// ストアエラーを操作名付きの`Internal`に包むクロージャを返す
    pub fn store(operation: &'static str) -> impl FnOnce(StoreError) -> LendingError {
        move |source| LendingError::Internal { operation, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            LendingError::MissingField(_) => ErrorKind::MissingField,
            LendingError::InvalidFormat(_) => ErrorKind::InvalidFormat,
            LendingError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            LendingError::NotFound(_) => ErrorKind::NotFound,
            LendingError::CannotRemove(_) => ErrorKind::CannotRemove,
            LendingError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn status_class(&self) -> StatusClass {
        match self.kind() {
            ErrorKind::MissingField | ErrorKind::InvalidFormat => StatusClass::BadRequest,
            ErrorKind::NotFound => StatusClass::NotFound,
            ErrorKind::AlreadyExists | ErrorKind::CannotRemove => StatusClass::Conflict,
            ErrorKind::Internal => StatusClass::ServerError,
        }
    }

    /// 利用者向けメッセージ
    ///
    /// `Internal`の詳細は返さない（ログにのみ出力する）。
    pub fn message(&self) -> &'static str {
        match self {
            LendingError::MissingField(msg)
            | LendingError::InvalidFormat(msg)
            | LendingError::AlreadyExists(msg)
            | LendingError::NotFound(msg)
            | LendingError::CannotRemove(msg) => *msg,
            LendingError::Internal { .. } => INTERNAL,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LendingError>;
