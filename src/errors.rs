//! Typed error hierarchy for the board core.
//!
//! `BoardError` is what the store and the reindexing operations return. Every
//! variant is raised inside the owning transaction, so by the time a caller
//! sees one the transaction has already been rolled back. The REST and
//! GraphQL adapters map the variants onto status codes / error extensions via
//! [`BoardError::kind`].

use thiserror::Error;

/// Errors from the store and the reindexing operations.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Column {id} not found")]
    ColumnNotFound { id: String },

    #[error("Card {id} not found")]
    CardNotFound { id: String },

    #[error("Card {card_id} is not in column {expected} (found in {actual})")]
    Conflict {
        card_id: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification used by the transport adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Internal,
}

impl BoardError {
    pub fn validation(msg: impl Into<String>) -> Self {
        BoardError::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BoardError::ColumnNotFound { .. } | BoardError::CardNotFound { .. } => {
                ErrorKind::NotFound
            }
            BoardError::Conflict { .. } => ErrorKind::Conflict,
            BoardError::Validation(_) => ErrorKind::Validation,
            BoardError::Database(_) | BoardError::LockPoisoned | BoardError::Other(_) => {
                ErrorKind::Internal
            }
        }
    }
}

pub type BoardResult<T> = Result<T, BoardError>;
