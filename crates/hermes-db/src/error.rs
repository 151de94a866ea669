use hermes_types::{RecordId, ValidationError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The write was rejected by the record's schema.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("{collection}: no record with id {id}")]
    NotFound { collection: String, id: RecordId },

    #[error("{collection}: a record with id {id} already exists")]
    DuplicateId { collection: String, id: RecordId },

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("invalid table prefix {0:?}: only ASCII letters, digits and '_' are allowed")]
    InvalidTablePrefix(String),

    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("document codec: {0}")]
    Codec(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
