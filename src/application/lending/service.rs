use crate::domain::{CatalogEntity, IdError, Isbn, UserId};
use crate::ports::*;
use std::sync::Arc;

use super::errors::{INVALID_ISBN, INVALID_USER_ID, LendingError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、各ユースケース関数に依存関係を渡す。
/// プロセス全体で共有するグローバルなハンドルは使わない。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub books: Arc<BookCatalog>,
    pub users: Arc<UserRoster>,
    pub ledger: Arc<dyn LendingLedger>,
}

/// 登録の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// 新規に行を追加した
    Created,
    /// 退役済みの行を復活させた
    Resurrected,
}

/// 書式チェックのみ行うISBNの検証（0も書式不正として扱う）
pub(super) fn require_isbn(raw: i64) -> Result<Isbn> {
    Isbn::parse(raw).map_err(|_| LendingError::InvalidFormat(INVALID_ISBN))
}

/// 書式チェックのみ行う会員IDの検証（0も書式不正として扱う）
pub(super) fn require_user_id(raw: i64) -> Result<UserId> {
    UserId::parse(raw).map_err(|_| LendingError::InvalidFormat(INVALID_USER_ID))
}

/// 必須チェック付きの識別子の検証
///
/// 0なら`MissingField(missing)`、書式不正なら`InvalidFormat(invalid)`。
pub(super) fn parse_id<T>(
    parsed: std::result::Result<T, IdError>,
    missing: &'static str,
    invalid: &'static str,
) -> Result<T> {
    parsed.map_err(|e| match e {
        IdError::Missing => LendingError::MissingField(missing),
        IdError::InvalidFormat => LendingError::InvalidFormat(invalid),
    })
}

/// 登録または復活（書籍・会員で共通）
///
/// 1. 退役済みの行があれば復活させて終了（属性は再検証しない）
/// 2. 無ければ`validate_fresh`で新規登録の項目を確認してから追加する
/// 3. 追加時の一意制約違反は有効な行が既にあることを意味し、`AlreadyExists`
pub(super) async fn add_or_resurrect<E: CatalogEntity>(
    store: &dyn CatalogStore<E>,
    entity: E,
    validate_fresh: impl FnOnce(&E) -> Result<()>,
    already_exists: &'static str,
) -> Result<Registration> {
    let key = entity.key();

    let retired = store
        .check_retired(key)
        .await
        .map_err(LendingError::store("check retired"))?;

    if retired {
        store
            .unretire(key)
            .await
            .map_err(LendingError::store("unretire"))?;
        return Ok(Registration::Resurrected);
    }

    validate_fresh(&entity)?;

    match store.register(&entity).await {
        Ok(()) => Ok(Registration::Created),
        Err(StoreError::Conflict) => Err(LendingError::AlreadyExists(already_exists)),
        Err(e) => Err(LendingError::store("register")(e)),
    }
}
