//! Error types for the approval engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::DocumentStatus;

/// Comprehensive error type for all approval engine operations.
#[derive(Error, Debug)]
pub enum ApprovalError {
    /// Storage connection or query errors. Nothing is durably changed when
    /// this is returned from a decision, so the call may be retried as is.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Document not found for the given ID
    #[error("Document with ID {id} not found")]
    DocumentNotFound { id: u64 },
    /// Generic lookup miss for users, accounts and prefixes
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    Validation { field: String, reason: String },
    /// The actor may not decide the step, or the step is not the current one
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },
    /// The document already reached a terminal status
    #[error("Document {id} already finalized ({status})")]
    AlreadyFinalized { id: u64, status: DocumentStatus },
    /// The tracking entry for the step already carries a decision
    #[error("Step {step} of document {id} already decided")]
    AlreadyDecided { id: u64, step: u32 },
    /// Another writer committed a decision first
    #[error("Document {id} was modified concurrently (expected version {expected})")]
    Conflict { id: u64, expected: u64 },
    /// Every generated candidate collided with an existing control number
    #[error("Could not generate unique control number for prefix '{prefix}' after {attempts} attempts")]
    ControlNumberExhausted { prefix: String, attempts: u32 },
    /// Stored status or step pointer contradicts the tracking ledger
    #[error("Document {id} is inconsistent: {reason}")]
    Inconsistent { id: u64, reason: String },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> ApprovalError {
        ApprovalError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct ValidationBuilder {
    field: String,
}

impl ValidationBuilder {
    /// Create a new validation error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> ApprovalError {
        ApprovalError::Validation {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl ApprovalError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn validation(field: impl Into<String>) -> ValidationBuilder {
        ValidationBuilder::new(field)
    }

    /// Creates a forbidden error with the given reason.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    /// Creates a not-found error for a non-document entity.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Whether repeating the exact same call can succeed.
    ///
    /// Only storage failures and lost optimistic races qualify. Validation,
    /// authorization and finalization errors describe the request itself and
    /// will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database { .. } | Self::Conflict { .. })
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| ApprovalError::database(message).with_source(e))
    }
}

/// Result type alias for approval operations
pub type Result<T> = std::result::Result<T, ApprovalError>;
