use std::fmt;

/// 識別子の検証エラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdError {
    /// 値が0（未入力）
    Missing,
    /// 桁数が不正
    InvalidFormat,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::Missing => f.write_str("identifier is missing"),
            IdError::InvalidFormat => f.write_str("identifier has an invalid number of digits"),
        }
    }
}

impl std::error::Error for IdError {}
