//! Error types for timer operations and persistence

use thiserror::Error;

/// Errors returned by registry operations.
///
/// Both kinds are local and recoverable: the caller decides how to surface them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// A timer was requested with a zero duration
    #[error("Invalid duration: a timer needs at least one second")]
    InvalidDuration,

    /// The referenced timer is not registered
    #[error("Unknown timer: {0}")]
    UnknownTimer(String),
}

/// Failure to write state to durable storage.
///
/// Never rolls back the in-memory change that triggered the write.
#[derive(Error, Debug)]
pub enum PersistenceFailure {
    /// Filesystem error while writing a key
    #[error("Failed to write '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// State could not be serialized
    #[error("Failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The store refused the write (quota, read-only, ...)
    #[error("Storage rejected write to '{key}': {reason}")]
    Rejected { key: String, reason: String },
}

impl PersistenceFailure {
    /// Storage key the failed write was aimed at
    pub fn key(&self) -> &str {
        match self {
            PersistenceFailure::Io { key, .. }
            | PersistenceFailure::Serialize { key, .. }
            | PersistenceFailure::Rejected { key, .. } => key,
        }
    }
}
