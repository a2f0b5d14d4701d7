//! Command/event protocol for the case workflow.
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Commands sent by a caller (API layer, CLI) to the core
//! - `Event`: Notifications emitted by the core after a command was handled
//!
//! Every accepted command produces exactly one event. Rejected commands
//! produce a `CommandRejected` event and leave the case untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::case_models::{DeliveryStatus, DoctorRef};
use crate::policy_models::JumpPolicy;

/// Commands sent to the core.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "transition",
///   "payload": {
///     "case_id": "uuid-here",
///     "target_order": 3
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Create a case from a Type's current stage templates.
    CreateCase {
        type_id: String,
        doctor: DoctorRef,
        jump_policy: JumpPolicy,
    },

    /// Move the current stage pointer to the stage with `target_order`.
    Transition {
        #[ts(type = "string")]
        case_id: Uuid,
        target_order: u32,
    },

    /// Move to the next stage.
    Advance {
        #[ts(type = "string")]
        case_id: Uuid,
    },

    /// Move back to the previous stage.
    Rewind {
        #[ts(type = "string")]
        case_id: Uuid,
    },

    /// Mark the current stage done without moving.
    CompleteStage {
        #[ts(type = "string")]
        case_id: Uuid,
    },

    /// Schedule delivery of a fully done case.
    Schedule {
        #[ts(type = "string")]
        case_id: Uuid,
        date: DateTime<Utc>,
    },

    /// Record that the case was delivered.
    Deliver {
        #[ts(type = "string")]
        case_id: Uuid,
        date: Option<DateTime<Utc>>,
    },

    /// Record that the case came back from the doctor.
    ReturnCase {
        #[ts(type = "string")]
        case_id: Uuid,
    },

    /// Doctor acknowledges reception of a delivered case.
    Approve {
        #[ts(type = "string")]
        case_id: Uuid,
        doctor_id: String,
    },
}

impl Op {
    /// The case the command targets, if it targets an existing case.
    pub fn case_id(&self) -> Option<Uuid> {
        match self {
            Op::CreateCase { .. } => None,
            Op::Transition { case_id, .. }
            | Op::Advance { case_id }
            | Op::Rewind { case_id }
            | Op::CompleteStage { case_id }
            | Op::Schedule { case_id, .. }
            | Op::Deliver { case_id, .. }
            | Op::ReturnCase { case_id }
            | Op::Approve { case_id, .. } => Some(*case_id),
        }
    }
}

/// Events emitted by the core.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "stageChanged",
///   "payload": {
///     "case_id": "uuid-here",
///     "from_order": 1,
///     "to_order": 2,
///     "progress": 50
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A case was created from a Type.
    CaseCreated {
        #[ts(type = "string")]
        case_id: Uuid,
        type_id: String,
        stage_count: usize,
    },

    /// The current stage pointer moved.
    StageChanged {
        #[ts(type = "string")]
        case_id: Uuid,
        from_order: Option<u32>,
        to_order: u32,
        progress: u8,
    },

    /// A stage was marked done without moving the pointer.
    StageCompleted {
        #[ts(type = "string")]
        case_id: Uuid,
        order: u32,
        progress: u8,
        fully_done: bool,
    },

    /// The delivery status changed.
    DeliveryUpdated {
        #[ts(type = "string")]
        case_id: Uuid,
        status: DeliveryStatus,
    },

    /// The assigned doctor acknowledged reception.
    CaseApproved {
        #[ts(type = "string")]
        case_id: Uuid,
        by: String,
    },

    /// A command was rejected. The case is unchanged.
    CommandRejected {
        #[ts(type = "string | null")]
        case_id: Option<Uuid>,
        reason: String,
    },
}
