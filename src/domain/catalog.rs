use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

use super::{Isbn, UserId};

// ============================================================================
// 論理削除のライフサイクル
// ============================================================================

/// 行のライフサイクル
///
/// 物理削除は行わない。退役（論理削除）は行の不在ではなく状態として表す。
/// 永続化時は`retired_at`（NULL許容）にマッピングされる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Lifecycle {
    Active,
    Retired { retired_at: DateTime<Utc> },
}

impl Lifecycle {
    /// `retired_at`列の値から復元する
    pub fn from_retired_at(retired_at: Option<DateTime<Utc>>) -> Self {
        match retired_at {
            Some(retired_at) => Lifecycle::Retired { retired_at },
            None => Lifecycle::Active,
        }
    }

    pub fn retired_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Lifecycle::Active => None,
            Lifecycle::Retired { retired_at } => Some(*retired_at),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Lifecycle::Active)
    }

    pub fn is_retired(&self) -> bool {
        !self.is_active()
    }
}

/// 既に退役済みの行を再度退役させようとした
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyRetired;

/// カタログで管理されるエンティティ（書籍・会員）
///
/// 書籍と会員は同じ論理削除・復活ルールに従うため、
/// カタログストアはこのトレイトでパラメータ化される。
pub trait CatalogEntity: Clone + Send + Sync + 'static {
    type Key: Copy + Eq + Hash + Ord + fmt::Display + fmt::Debug + Send + Sync + 'static;

    fn key(&self) -> Self::Key;

    fn lifecycle(&self) -> Lifecycle;

    fn with_lifecycle(self, lifecycle: Lifecycle) -> Self;
}

/// 純粋関数：エンティティを退役させる
///
/// 副作用なし。退役済みのエンティティは`AlreadyRetired`。
pub fn retire<E: CatalogEntity>(entity: E, at: DateTime<Utc>) -> Result<E, AlreadyRetired> {
    if entity.lifecycle().is_retired() {
        return Err(AlreadyRetired);
    }
    Ok(entity.with_lifecycle(Lifecycle::Retired { retired_at: at }))
}

/// 純粋関数：退役済みのエンティティを復活させる
///
/// 属性（タイトル・著者・氏名）は変更しない。
pub fn resurrect<E: CatalogEntity>(entity: E) -> E {
    entity.with_lifecycle(Lifecycle::Active)
}

// ============================================================================
// 書籍
// ============================================================================

/// 書籍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: Isbn,
    pub title: String,
    pub author: String,
    pub lifecycle: Lifecycle,
}

impl Book {
    /// 新規登録される書籍（Active）
    pub fn new(isbn: Isbn, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            isbn,
            title: title.into(),
            author: author.into(),
            lifecycle: Lifecycle::Active,
        }
    }
}

impl CatalogEntity for Book {
    type Key = Isbn;

    fn key(&self) -> Isbn {
        self.isbn
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn with_lifecycle(self, lifecycle: Lifecycle) -> Self {
        Self { lifecycle, ..self }
    }
}

// ============================================================================
// 会員
// ============================================================================

/// 会員
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub lifecycle: Lifecycle,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            lifecycle: Lifecycle::Active,
        }
    }
}

impl CatalogEntity for User {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn with_lifecycle(self, lifecycle: Lifecycle) -> Self {
        Self { lifecycle, ..self }
    }
}
