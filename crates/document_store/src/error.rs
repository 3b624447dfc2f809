//! Document store error types.

use thiserror::Error;

use crate::Collection;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum DocumentStoreError {
    /// Document not found.
    #[error("{collection} document not found: {id}")]
    NotFound { collection: Collection, id: String },

    /// Duplicate document.
    #[error("{collection} document already exists: {id}")]
    AlreadyExists { collection: Collection, id: String },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored document does not have the expected shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl DocumentStoreError {
    /// Creates a not found error.
    pub fn not_found(collection: Collection, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection,
            id: id.into(),
        }
    }

    /// Creates an already exists error.
    pub fn already_exists(collection: Collection, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            collection,
            id: id.into(),
        }
    }

    /// Returns true for a conditional-insert conflict.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, DocumentStoreError>;
