//! Local SQLite collection store.

pub mod error;
pub mod repository;
pub mod schema;

pub use error::DbError;
pub use repository::{CardRecord, ImportCard, ImportStats, SqliteRepository};
