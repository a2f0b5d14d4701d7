//! Error taxonomy for workflow commands.
//!
//! Every rejection is typed and leaves the targeted case or type untouched.
//! Nothing here is retried automatically.

use crate::repository::RepositoryError;
use lf_protocol::JumpPolicy;
use thiserror::Error;
use uuid::Uuid;

/// Problems with stage template data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty or missing.
    #[error("Stage field `{field}` must not be empty")]
    EmptyField { field: &'static str },

    /// Two or more templates of one Type share a key (case-insensitive).
    #[error("Duplicate stage keys: {}", .0.join(", "))]
    DuplicateKeys(Vec<String>),

    /// Orders are 1-based.
    #[error("Invalid stage order {0}: orders start at 1")]
    InvalidOrder(u32),

    /// A Type with this id already exists.
    #[error("Type `{0}` already exists")]
    DuplicateType(String),
}

/// Errors returned by workflow commands.
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// Template data failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The acting principal may not perform the command.
    #[error("Not authorized: {reason}")]
    Authorization { reason: String },

    /// The jump policy rejected the move, or the move was a no-op.
    #[error("Transition from stage {from} to stage {to} is not allowed under policy {policy}")]
    InvalidTransition {
        from: u32,
        to: u32,
        policy: JumpPolicy,
    },

    /// The delivery/approval state does not permit the command.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A referenced type, stage or case does not exist.
    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },

    /// Reading or writing a case failed. The in-memory case was not changed.
    #[error("Persistence failed: {0}")]
    Persistence(#[from] RepositoryError),
}

impl WorkflowError {
    pub(crate) fn type_not_found(id: &str) -> Self {
        WorkflowError::NotFound {
            kind: "Type",
            id: id.to_string(),
        }
    }

    pub(crate) fn stage_not_found(key: &str) -> Self {
        WorkflowError::NotFound {
            kind: "Stage",
            id: key.to_string(),
        }
    }

    pub(crate) fn case_not_found(id: Uuid) -> Self {
        WorkflowError::NotFound {
            kind: "Case",
            id: id.to_string(),
        }
    }
}

/// Type alias for Result with WorkflowError.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
