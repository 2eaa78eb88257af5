use crate::domain::{Book, CatalogEntity, User};
use async_trait::async_trait;

use super::store_error::Result;

/// カタログストアポート
///
/// 書籍・会員の行の存在と可視性を論理削除付きで管理する。
/// 書籍（ISBNキー）と会員（会員IDキー）で同じ操作を持つため、エンティティ型で
/// パラメータ化している。
#[async_trait]
pub trait CatalogStore<E: CatalogEntity>: Send + Sync {
    /// 退役済みの行が存在するか確認する
    ///
    /// 再登録時の「復活」ケースの判定に使用される。
    async fn check_retired(&self, key: E::Key) -> Result<bool>;

    /// 新しい行を追加する
    ///
    /// 同じキーの行が既にある場合は`StoreError::Conflict`。
    async fn register(&self, entity: &E) -> Result<()>;

    /// 退役済みの行を有効に戻す
    ///
    /// 書籍の場合、退役時に残っていた有効な貸出は同時に返却済みにする
    /// （復活した書籍は貸出可能になる）。貸出記録自体は削除しない。
    async fn unretire(&self, key: E::Key) -> Result<()>;

    /// 有効な行を退役させる
    ///
    /// 影響を受けた行数を返す。0は「該当なし」を意味する。
    /// 会員の場合、有効な貸出がある間は`StoreError::Referenced`。
    async fn retire(&self, key: E::Key) -> Result<u64>;

    /// 有効な行を取得する
    async fn fetch(&self, key: E::Key) -> Result<Option<E>>;

    /// 有効な行をすべて取得する（キー昇順）
    async fn list_active(&self) -> Result<Vec<E>>;
}

/// 書籍カタログ
pub type BookCatalog = dyn CatalogStore<Book>;

/// 会員名簿
pub type UserRoster = dyn CatalogStore<User>;
