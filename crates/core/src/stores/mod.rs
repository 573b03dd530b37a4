pub mod sqlite;

pub use sqlite::SqliteBillStore;
