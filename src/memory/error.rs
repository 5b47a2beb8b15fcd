//! Error types for the memory engine.

use thiserror::Error;

/// Malformed caller input. `field` names the offending field
/// (`role`, `id`, `content`, `strength` or `type`).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors surfaced to callers of the memory service.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// First rejected item of a batch; the other items were still attempted.
    #[error("engram #{index} rejected: {source}")]
    Batch {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

/// Durable storage failures. These are logged by the store and never
/// abort a `remember` or `recall`.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to open store at {path}: {reason}")]
    Open { path: String, reason: String },
}
