use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::{sync::Arc, time::Duration};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use super::handlers::{
    AppState, borrow_book, get_book, get_book_state, get_user, list_available_books, list_books,
    list_user_loans, list_users, register_book, register_user, remove_user, retire_book,
    return_book,
};

/// Creates the API router with all lending endpoints
///
/// Books:
/// - POST /books, GET /books, GET /books/available
/// - GET /books/:isbn, GET /books/:isbn/state, DELETE /books/:isbn
///
/// Loans:
/// - POST /loans, POST /loans/:isbn/return
///
/// Users:
/// - POST /users, GET /users, GET /users/:id, DELETE /users/:id
/// - GET /users/:id/loans
///
/// A request that exceeds `request_timeout` is dropped and answered with 408.
pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/books", post(register_book).get(list_books))
        .route("/books/available", get(list_available_books))
        .route("/books/:isbn", get(get_book).delete(retire_book))
        .route("/books/:isbn/state", get(get_book_state))
        .route("/loans", post(borrow_book))
        .route("/loans/:isbn/return", post(return_book))
        .route("/users", post(register_user).get(list_users))
        .route("/users/:id", get(get_user).delete(remove_user))
        .route("/users/:id/loans", get(list_user_loans))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
