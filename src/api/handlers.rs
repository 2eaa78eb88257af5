use crate::application::lending::{self, Registration, ServiceDependencies};
use crate::domain::commands::ReturnBook;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        BookAddedResponse, BookBorrowedResponse, BookResponse, BookReturnedResponse,
        BookStateResponse, BorrowBookRequest, LoanResponse, RegisterBookRequest,
        RegisterUserRequest, UserAddedResponse, UserResponse,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Books
// ============================================================================

/// POST /books - 書籍を登録
///
/// 退役済みのISBNであれば復活させる。どちらの場合も201を返す。
pub async fn register_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterBookRequest>,
) -> Result<(StatusCode, Json<BookAddedResponse>), ApiError> {
    let isbn = req.isbn;
    let registration: Registration =
        lending::register_book(&state.service_deps, req.to_command()).await?;

    tracing::debug!(isbn, ?registration, "register book handled");

    let response = BookAddedResponse {
        message: "book added successfully".to_string(),
        isbn,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /books - 有効な書籍の一覧
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = lending::list_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/available - 貸出可能な書籍の一覧
pub async fn list_available_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = lending::list_available_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:isbn
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(isbn): Path<i64>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = lending::get_book(&state.service_deps, isbn).await?;
    Ok(Json(BookResponse::from(book)))
}

/// GET /books/:isbn/state
pub async fn get_book_state(
    State(state): State<Arc<AppState>>,
    Path(isbn): Path<i64>,
) -> Result<Json<BookStateResponse>, ApiError> {
    let book_state = lending::book_state(&state.service_deps, isbn).await?;
    Ok(Json(BookStateResponse {
        isbn,
        state: book_state,
    }))
}

/// DELETE /books/:isbn - 書籍を退役させる
pub async fn retire_book(
    State(state): State<Arc<AppState>>,
    Path(isbn): Path<i64>,
) -> Result<StatusCode, ApiError> {
    lending::retire_book(&state.service_deps, isbn).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Loans
// ============================================================================

/// POST /loans - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - ISBN・会員IDが入力されていること
/// - ISBNが5桁、会員IDが4桁であること
/// - 書籍が有効かつ貸出中でないこと
/// - 会員が有効であること
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BorrowBookRequest>,
) -> Result<(StatusCode, Json<BookBorrowedResponse>), ApiError> {
    let loan = lending::borrow_book(&state.service_deps, req.to_command()).await?;

    let response = BookBorrowedResponse {
        message: "book borrowed successfully".to_string(),
        isbn: loan.isbn.value(),
        user_id: loan.user_id.value(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /loans/:isbn/return - 書籍を返却
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    Path(isbn): Path<i64>,
) -> Result<Json<BookReturnedResponse>, ApiError> {
    lending::return_book(&state.service_deps, ReturnBook { isbn }).await?;

    Ok(Json(BookReturnedResponse {
        message: "book returned successfully".to_string(),
        isbn,
    }))
}

// ============================================================================
// Users
// ============================================================================

/// POST /users - 会員を登録（退役済みなら復活）
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserAddedResponse>), ApiError> {
    let id = req.id;
    lending::register_user(&state.service_deps, req.to_command()).await?;

    let response = UserAddedResponse {
        message: "user added successfully".to_string(),
        id,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = lending::list_users(&state.service_deps).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = lending::get_user(&state.service_deps, id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// DELETE /users/:id - 会員を退役させる
///
/// 貸出中の書籍がある会員は退役できない（409）。
pub async fn remove_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    lending::remove_user(&state.service_deps, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/:id/loans - 会員の貸出履歴（返却済みを含む）
pub async fn list_user_loans(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let loans = lending::user_loans(&state.service_deps, id).await?;
    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}
