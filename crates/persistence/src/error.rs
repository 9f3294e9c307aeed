//! Failures raised by the persistence collaborator.

use thiserror::Error;

/// Error thrown by a [`DocumentRepository`](crate::DocumentRepository).
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Writing to (or reading from) the storage medium failed.
    #[error("storage failure: {0}")]
    Storage(String),

    /// The document violates its schema.
    ///
    /// Each message has the shape `"<field>: <text>"`.
    #[error("document validation failed: {}", .messages.join("; "))]
    Validation { messages: Vec<String> },

    /// No document has been stored yet.
    #[error("document not found")]
    NotFound,

    /// A document or section could not be (de)serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PersistenceError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn validation<S: Into<String>>(messages: impl IntoIterator<Item = S>) -> Self {
        Self::Validation {
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// Category name used by error mapping tables.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Storage(_) => "StorageError",
            Self::Validation { .. } => "ValidationError",
            Self::NotFound => "NotFoundError",
            Self::Serialization(_) => "SerializationError",
        }
    }

    /// Raw field messages of a validation failure.
    pub fn validation_messages(&self) -> Option<&[String]> {
        match self {
            Self::Validation { messages } => Some(messages),
            _ => None,
        }
    }
}
