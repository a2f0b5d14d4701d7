//! Error types for case persistence.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while reading or writing cases.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Failed to read or write a case file.
    #[error("Failed to access case file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to encode or decode a case.
    #[error("Failed to (de)serialize case file at {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The stored case was written by someone else since it was loaded.
    #[error("Case {case_id} was modified concurrently (expected version {expected}, found {found})")]
    VersionConflict {
        case_id: Uuid,
        expected: u64,
        found: u64,
    },

    /// Update of a case that is not stored.
    #[error("Case {0} is not stored")]
    Missing(Uuid),

    /// Insert of a case that is already stored.
    #[error("Case {0} already exists")]
    AlreadyExists(Uuid),
}

/// Type alias for Result with RepositoryError.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
