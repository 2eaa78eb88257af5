//! 識別子の書式ルール
//!
//! 副作用のない述語関数のみを提供する。エラーは返さず、
//! 呼び出し側（アプリケーション層）が型付きの失敗に変換する。

/// ISBNの桁数下限（5桁）
const ISBN_DIVISOR: i64 = 10_000;

/// 会員IDの桁数下限（4桁）
const USER_ID_DIVISOR: i64 = 1_000;

/// ISBNが5桁（先頭は1〜9）か判定する
pub fn is_valid_isbn(isbn: i64) -> bool {
    (1..=9).contains(&(isbn / ISBN_DIVISOR))
}

/// 会員IDが4桁（先頭は1〜9）か判定する
pub fn is_valid_user_id(id: i64) -> bool {
    (1..=9).contains(&(id / USER_ID_DIVISOR))
}

/// 書籍登録の必須項目が揃っているか判定する
///
/// ISBNのみを見る。タイトル・著者は新規登録時にサービス層で確認する
/// （復活時は既存の値をそのまま使うため検証しない）。
pub fn has_required_book_fields(isbn: i64, _title: &str, _author: &str) -> bool {
    isbn != 0
}
