//! Runtime case models.
//!
//! A [`Case`] owns its own copy of the stage sequence it was created from,
//! plus the delivery and approval sub-state consumed by the prescribing
//! doctor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;
use uuid::Uuid;

use crate::policy_models::JumpPolicy;

/// Lifecycle status of a single stage.
///
/// Progresses Pending -> InProgress -> Done. A rewind can reopen a done
/// stage or reset later stages back to Pending.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Not started.
    #[default]
    Pending,

    /// Work on this stage has started.
    InProgress,

    /// The stage is finished.
    Done,
}

/// A per-case copy of a stage template carrying live status and timestamps.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct Stage {
    pub key: String,
    pub name: String,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub allowed_roles: BTreeSet<String>,

    #[serde(default)]
    pub status: StageStatus,

    /// Stamped the first time the stage becomes in progress.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,

    /// Stamped when the stage becomes done.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Stage {
    pub fn is_done(&self) -> bool {
        self.status == StageStatus::Done
    }
}

/// Status of the physical handoff of a completed case.
///
/// Normal flow: Pending -> Scheduled -> Delivered -> Returned.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Scheduled,
    Delivered,
    Returned,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Scheduled => "scheduled",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery sub-state of a case.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, TS)]
pub struct Delivery {
    pub status: DeliveryStatus,

    /// Planned date while scheduled, actual date once delivered.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Doctor-side acknowledgment that a delivered case was received.
///
/// Once `approved` is true it never goes back to false.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, TS)]
pub struct CaseApproval {
    pub approved: bool,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    /// Identifier of the doctor who approved.
    #[serde(default)]
    pub by: Option<String>,
}

/// Display summary of a doctor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct DoctorSummary {
    pub id: String,
    pub name: String,
}

/// Reference to the doctor a case is assigned to.
///
/// Serialized untagged, so it reads either a bare id string or a
/// `{ "id", "name" }` object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(untagged)]
pub enum DoctorRef {
    /// Only the identifier is known.
    Unresolved(String),

    /// Identifier plus display data.
    Resolved(DoctorSummary),
}

impl DoctorRef {
    /// The doctor's identifier, whichever form the reference takes.
    pub fn id(&self) -> &str {
        match self {
            DoctorRef::Unresolved(id) => id,
            DoctorRef::Resolved(summary) => &summary.id,
        }
    }
}

/// One unit of work progressing through its own stage sequence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct Case {
    #[ts(type = "string")]
    pub id: Uuid,

    /// The Type this case was instantiated from. Informational only; the
    /// stage list is never re-read from the Type.
    pub type_id: String,

    pub doctor: DoctorRef,

    /// Policy chosen at creation time.
    pub jump_policy: JumpPolicy,

    /// Stages sorted by `order`, orders dense 1..N.
    pub stages: Vec<Stage>,

    /// Order of the current stage. `None` or an order that matches no stage
    /// means the position is derived from stage statuses.
    #[serde(default)]
    pub current_stage_order: Option<u32>,

    #[serde(default)]
    pub delivery: Delivery,

    #[serde(default)]
    pub case_approval: CaseApproval,

    /// Optimistic concurrency token, incremented on every accepted write.
    #[serde(default)]
    pub version: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Case {
    /// True iff every stage is done. Derived, never stored.
    ///
    /// A case without stages is never fully done.
    pub fn is_fully_done(&self) -> bool {
        !self.stages.is_empty() && self.stages.iter().all(Stage::is_done)
    }
}

/// The acting user of a command.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, TS)]
pub struct Principal {
    pub user_id: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(user_id: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id: user_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// Authoritative projection of a case returned by every command.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct CaseView {
    pub case: Case,

    /// Completion percentage, 0..=100.
    pub progress: u8,

    pub fully_done: bool,
}
