//! Error types for bowlise-core.
//!
//! The cache facade hands the same failure out more than once (a cached
//! per-target error is returned on every later lookup), so [`Error`] is
//! `Clone`. Underlying sources are held behind an [`Arc`] for that reason.

use std::sync::Arc;

/// Result type alias for bowlise operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Shared, clonable error source.
pub type ErrorSource = Arc<dyn std::error::Error + Send + Sync>;

/// Errors raised by access-control backends and the cache facade.
///
/// Backend errors are opaque to the facade and passed through unchanged.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Backend failure (connection loss, driver error, etc.)
    #[error("Backend error: {message}")]
    Backend {
        /// Human-readable error message
        message: String,
        /// Source error if available
        #[source]
        source: Option<ErrorSource>,
    },

    /// A record, role, or permission the operation depends on does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// What kind of entity was looked up ("role", "access control", ...)
        kind: String,
        /// Identifier that was not found
        id: String,
    },

    /// The write conflicts with existing state.
    #[error("Conflict: {message}")]
    Conflict {
        /// What conflicted
        message: String,
    },

    /// The backend's bulk reply had no entry for a requested target.
    #[error("Backend returned no entry for target '{target_id}'")]
    MissingBulkEntry {
        /// Target id missing from the reply
        target_id: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error (reading configuration files)
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),
}

impl Error {
    /// Returns whether retrying the same call could succeed.
    ///
    /// Backend and I/O failures are treated as transient. Missing
    /// entities, conflicts and configuration problems are permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Backend { .. } => true,
            Error::Io(_) => true,
            Error::MissingBulkEntry { .. } => true,
            Error::NotFound { .. } => false,
            Error::Conflict { .. } => false,
            Error::Config { .. } => false,
        }
    }

    /// Creates a new backend error with a message.
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Error::Backend {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new backend error with a message and source error.
    pub fn backend_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Backend {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Creates a new not-found error.
    pub fn not_found<K, I>(kind: K, id: I) -> Self
    where
        K: Into<String>,
        I: Into<String>,
    {
        Error::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Creates a new conflict error.
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Error::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a missing-bulk-entry error for a target.
    pub fn missing_bulk_entry<S: Into<String>>(target_id: S) -> Self {
        Error::MissingBulkEntry {
            target_id: target_id.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(Arc::new(err))
    }
}
