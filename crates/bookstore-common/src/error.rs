//! Unified error type for the bookstore workspace.
//!
//! Storage, configuration, and schema failures are all funnelled into
//! [`Error`] so that callers handle a single type at every unit-of-work
//! boundary.

use std::fmt;

/// Unified error type covering all failure modes in bookstore.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "Book", "Publisher").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Entity data failed validation before reaching storage.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A unique constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A foreign key, check, or not-null constraint rejected the write.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// The entity mappings or the live schema are inconsistent.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The configuration could not be parsed or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The session factory has been closed.
    #[error("Session factory is closed")]
    Closed,

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Convenience constructor for [`Error::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Convenience constructor for [`Error::Schema`].
    pub fn schema(msg: impl Into<String>) -> Self {
        Error::Schema(msg.into())
    }

    /// Whether the storage layer rejected the write because of a constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Error::Conflict(_) | Error::Constraint(_))
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
