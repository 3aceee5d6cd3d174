//! Collection database errors.

use difficulty_core::{CardId, CollectionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("collection database: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("card {0} is not in the collection")]
    CardNotFound(CardId),
}

/// Missing cards keep their identity so the batch can report them per card;
/// everything else is a storage failure.
impl From<DbError> for CollectionError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::CardNotFound(id) => CollectionError::CardNotFound(id),
            DbError::Sqlite(e) => CollectionError::Storage(e.to_string()),
        }
    }
}
