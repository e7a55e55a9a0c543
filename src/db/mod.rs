pub mod migrations;
pub mod repository;
pub mod store;

pub use repository::Record;
pub use store::{Store, TableStore};
