pub mod catalog_store;
pub mod lending_ledger;
pub mod store_error;

pub use catalog_store::*;
pub use lending_ledger::*;
pub use store_error::{Result, StoreError};
