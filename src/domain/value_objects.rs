use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{IdError, validator};

/// ISBN - 書籍の識別子（5桁の正の整数）
///
/// 不変条件：`10000 <= isbn <= 99999`
/// コンストラクタは`parse`のみで、ストア層には検証済みの値しか渡らない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Isbn(i32);

impl Isbn {
    /// 生の整数値から検証済みISBNを作る
    ///
    /// # エラー
    /// - 0の場合は`IdError::Missing`
    /// - 5桁でない場合は`IdError::InvalidFormat`
    pub fn parse(raw: i64) -> Result<Self, IdError> {
        if raw == 0 {
            return Err(IdError::Missing);
        }
        if !validator::is_valid_isbn(raw) {
            return Err(IdError::InvalidFormat);
        }
        // 5桁に収まることは検証済み
        Ok(Self(raw as i32))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for Isbn {
    type Error = IdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Isbn> for i64 {
    fn from(isbn: Isbn) -> Self {
        i64::from(isbn.0)
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 会員ID（4桁の正の整数）
///
/// 不変条件：`1000 <= id <= 9999`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i32);

impl UserId {
    /// 生の整数値から検証済み会員IDを作る
    ///
    /// # エラー
    /// - 0の場合は`IdError::Missing`
    /// - 4桁でない場合は`IdError::InvalidFormat`
    pub fn parse(raw: i64) -> Result<Self, IdError> {
        if raw == 0 {
            return Err(IdError::Missing);
        }
        if !validator::is_valid_user_id(raw) {
            return Err(IdError::InvalidFormat);
        }
        Ok(Self(raw as i32))
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = IdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        i64::from(id.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 貸出記録ID - 貸出履歴の各行を識別する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}
