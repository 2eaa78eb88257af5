use serde::{Deserialize, Serialize};

// 識別子は呼び出し元から受け取った生の値のまま保持する。
// 検証はアプリケーション層で、ストアへアクセスする前に行う。

/// コマンド：書籍を登録する（退役済みなら復活）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBook {
    pub isbn: i64,
    pub title: String,
    pub author: String,
}

/// コマンド：会員を登録する（退役済みなら復活）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterUser {
    pub id: i64,
    pub name: String,
}

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub user_id: i64,
    pub isbn: i64,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub isbn: i64,
}
