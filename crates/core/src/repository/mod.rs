//! Case persistence.
//!
//! The workflow only needs load/save/list of whole cases. Writes are
//! conditional on the version the caller last saw, so a stale writer is
//! refused instead of silently overwriting a newer case.

pub mod error;
pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use lf_protocol::Case;
use uuid::Uuid;

pub use error::{RepositoryError, RepositoryResult};
pub use json_file::JsonFileCaseRepository;
pub use memory::InMemoryCaseRepository;

/// Storage for cases.
#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Load a case, `None` if it does not exist.
    async fn load(&self, id: Uuid) -> RepositoryResult<Option<Case>>;

    /// Store a new case.
    ///
    /// # Errors
    ///
    /// `AlreadyExists` if a case with the same id is stored.
    async fn insert(&self, case: &Case) -> RepositoryResult<()>;

    /// Replace a stored case whose version is `expected_version`.
    ///
    /// # Errors
    ///
    /// - `Missing` if the case is not stored
    /// - `VersionConflict` if the stored version differs
    async fn save(&self, case: &Case, expected_version: u64) -> RepositoryResult<()>;

    /// All stored cases.
    async fn list(&self) -> RepositoryResult<Vec<Case>>;
}

pub(crate) fn check_version(
    case_id: Uuid,
    stored: Option<u64>,
    expected: u64,
) -> RepositoryResult<()> {
    match stored {
        None => Err(RepositoryError::Missing(case_id)),
        Some(found) if found != expected => Err(RepositoryError::VersionConflict {
            case_id,
            expected,
            found,
        }),
        Some(_) => Ok(()),
    }
}
