mod book_service;
mod errors;
mod loan_service;
mod service;
mod user_service;

pub use book_service::{
    book_state, get_book, list_available_books, list_books, register_book, retire_book,
};
pub use errors::*;
pub use loan_service::{borrow_book, return_book};
pub use service::{Registration, ServiceDependencies};
pub use user_service::{get_user, list_users, register_user, remove_user, user_loans};
