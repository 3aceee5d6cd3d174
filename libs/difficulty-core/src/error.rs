//! Error types for difficulty-core.

use crate::types::CardId;
use thiserror::Error;

/// Errors raised while loading or editing the threshold configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config must be a JSON object")]
    NotAnObject,

    #[error("missing config key `{key}`")]
    MissingKey { key: &'static str },

    #[error("config key `{key}` must be a non-negative integer, got {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown config key `{0}`")]
    UnknownKey(String),
}

/// Errors raised while parsing a search query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unbalanced parentheses at position {position}")]
    UnbalancedParens { position: usize },

    #[error("empty group at position {position}")]
    EmptyGroup { position: usize },

    #[error("unterminated quote at position {position}")]
    UnterminatedQuote { position: usize },

    #[error("`{operator}` is missing an operand at position {position}")]
    DanglingOperator { operator: String, position: usize },

    #[error("unknown search field `{0}`")]
    UnknownField(String),

    #[error("invalid search term `{term}`: {reason}")]
    InvalidTerm { term: String, reason: String },
}

/// Errors surfaced by collection collaborators.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("invalid search: {0}")]
    InvalidSearch(#[from] QueryError),

    #[error("card not found: {0}")]
    CardNotFound(CardId),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors that abort a whole batch before any card is touched.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("{0}")]
    Search(CollectionError),
}

/// Result type alias using ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;
