use crate::domain::{Loan, User, UserId, commands::RegisterUser};
use crate::ports::StoreError;

use super::errors::*;
use super::service::{
    Registration, ServiceDependencies, add_or_resurrect, parse_id, require_user_id,
};

/// 会員を登録する（退役済みなら復活させる）
///
/// ビジネスルール：
/// - 会員IDが0でないこと、4桁であること
/// - 退役済みの同じIDがあれば復活させる
/// - 新規追加時は氏名が空でないこと
pub async fn register_user(deps: &ServiceDependencies, cmd: RegisterUser) -> Result<Registration> {
    let id = parse_id(UserId::parse(cmd.id), USER_DETAILS_REQUIRED, INVALID_USER_ID)?;

    let user = User::new(id, cmd.name);
    let registration = add_or_resurrect(
        deps.users.as_ref(),
        user,
        |user| {
            if user.name.trim().is_empty() {
                return Err(LendingError::MissingField(USER_NAME_REQUIRED));
            }
            Ok(())
        },
        USER_ALREADY_EXISTS,
    )
    .await?;

    tracing::info!(user_id = %id, ?registration, "user registered");
    Ok(registration)
}

/// 会員を退役させる（論理削除）
///
/// 書籍と異なり、有効な貸出がある会員は退役できない（`CannotRemove`）。
pub async fn remove_user(deps: &ServiceDependencies, id: i64) -> Result<()> {
    let id = require_user_id(id)?;

    let affected = match deps.users.retire(id).await {
        Ok(affected) => affected,
        Err(StoreError::Referenced) => return Err(LendingError::CannotRemove(USER_HOLDS_BOOK)),
        Err(e) => return Err(LendingError::store("retire user")(e)),
    };

    if affected == 0 {
        return Err(LendingError::NotFound(USER_DOES_NOT_EXIST));
    }

    tracing::info!(user_id = %id, "user removed");
    Ok(())
}

/// 有効な会員を取得する
pub async fn get_user(deps: &ServiceDependencies, id: i64) -> Result<User> {
    let id = require_user_id(id)?;

    deps.users
        .fetch(id)
        .await
        .map_err(LendingError::store("fetch user"))?
        .ok_or(LendingError::NotFound(USER_DOES_NOT_EXIST))
}

/// 有効な会員の一覧（0件は空の一覧）
pub async fn list_users(deps: &ServiceDependencies) -> Result<Vec<User>> {
    deps.users
        .list_active()
        .await
        .map_err(LendingError::store("list users"))
}

/// 会員の貸出履歴
///
/// 返却済みの記録も含む。会員が有効でない場合は`NotFound`。
pub async fn user_loans(deps: &ServiceDependencies, id: i64) -> Result<Vec<Loan>> {
    let user = get_user(deps, id).await?;

    deps.ledger
        .loans_for_user(user.id)
        .await
        .map_err(LendingError::store("list user loans"))
}
