use thiserror::Error;

/// ストア層のエラー
///
/// 一意制約・参照制約の違反だけを区別し、それ以外はバックエンドのエラーとして包む。
/// 利用者向けのメッセージやステータスはアプリケーション層が決める。
#[derive(Debug, Error)]
pub enum StoreError {
    /// 同じキーの行が既に存在する（一意制約違反）
    #[error("a row with the same key already exists")]
    Conflict,

    /// 有効な貸出記録から参照されている
    #[error("the row is referenced by an active lending record")]
    Referenced,

    /// バックエンド（DBドライバ等）のエラー
    #[error("storage backend failure")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, StoreError>;
