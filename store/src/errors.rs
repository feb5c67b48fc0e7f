//! Store error types
//!
//! Every failure the store can observe maps to one [`ErrorCategory`].
//! Public store operations never surface these: they log the category and
//! degrade to the absent value. The `try_*` accessors on
//! [`crate::RecordStore`] return them unchanged.

use thiserror::Error;

/// Error category for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// No storage scope exists (e.g. invoked outside a browsing context)
    BackendUnavailable,
    /// The backend failed a read, write or delete (quota, SQLite, I/O)
    BackendFailed,
    /// Stored text could not be decoded into the expected record
    MalformedData,
    /// A record could not be encoded to JSON
    SerializeFailed,
    /// Configuration file or environment is invalid
    ConfigError,
}

impl ErrorCategory {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BackendUnavailable => "BACKEND_UNAVAILABLE",
            Self::BackendFailed => "BACKEND_FAILED",
            Self::MalformedData => "MALFORMED_DATA",
            Self::SerializeFailed => "SERIALIZE_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

/// Failure reported by a [`crate::KeyValueBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("storage backend unavailable")]
    Unavailable,

    #[error("quota exceeded writing {key}: {bytes} bytes against a {quota} byte quota")]
    QuotaExceeded {
        key: String,
        bytes: usize,
        quota: usize,
    },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Store error with the key it concerns.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("backend error on {key}: {source}")]
    Backend {
        key: String,
        #[source]
        source: BackendError,
    },

    #[error("malformed record under {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize record for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

impl StoreError {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Backend {
                source: BackendError::Unavailable,
                ..
            } => ErrorCategory::BackendUnavailable,
            Self::Backend { .. } => ErrorCategory::BackendFailed,
            Self::Malformed { .. } => ErrorCategory::MalformedData,
            Self::Serialize { .. } => ErrorCategory::SerializeFailed,
            Self::Config { .. } => ErrorCategory::ConfigError,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn backend(key: &str, source: BackendError) -> Self {
        Self::Backend {
            key: key.to_string(),
            source,
        }
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
