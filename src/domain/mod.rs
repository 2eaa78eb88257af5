pub mod catalog;
pub mod commands;
pub mod errors;
pub mod loan;
pub mod validator;
pub mod value_objects;

pub use catalog::{Book, CatalogEntity, Lifecycle, User};
pub use errors::*;
pub use loan::{BookState, Loan, LoanState};
pub use value_objects::*;
