//! Case stage snapshot.
//!
//! When a case is created, the Type's current stage templates are copied
//! into a stage list owned by the case. Later edits to the Type never reach
//! existing cases.

use chrono::{DateTime, Utc};
use lf_protocol::{
    Case, CaseApproval, Delivery, DoctorRef, InitialStage, JumpPolicy, LabType, Stage, StageStatus,
};
use uuid::Uuid;

/// Deep-copy a Type's templates into a fresh stage list.
///
/// Stages come out sorted by order and renumbered 1..N, all pending with no
/// timestamps, except that [`InitialStage::FirstInProgress`] starts the
/// first stage at `now`.
pub fn instantiate(lab_type: &LabType, initial: InitialStage, now: DateTime<Utc>) -> Vec<Stage> {
    let mut templates = lab_type.stages.clone();
    templates.sort_by_key(|template| template.order);

    let mut stages: Vec<Stage> = templates
        .into_iter()
        .enumerate()
        .map(|(position, template)| Stage {
            key: template.key,
            name: template.name,
            order: position as u32 + 1,
            color: template.color,
            allowed_roles: template.allowed_roles,
            status: StageStatus::Pending,
            started_at: None,
            completed_at: None,
        })
        .collect();

    if initial == InitialStage::FirstInProgress {
        if let Some(first) = stages.first_mut() {
            first.status = StageStatus::InProgress;
            first.started_at = Some(now);
        }
    }

    stages
}

/// Build a new case from a Type.
///
/// The jump policy is required; there is no implicit default at this level.
pub fn create_case(
    lab_type: &LabType,
    doctor: DoctorRef,
    jump_policy: JumpPolicy,
    initial: InitialStage,
    now: DateTime<Utc>,
) -> Case {
    let stages = instantiate(lab_type, initial, now);
    let current_stage_order = stages.first().map(|stage| stage.order);

    Case {
        id: Uuid::new_v4(),
        type_id: lab_type.id.clone(),
        doctor,
        jump_policy,
        stages,
        current_stage_order,
        delivery: Delivery::default(),
        case_approval: CaseApproval::default(),
        version: 0,
        created_at: now,
        updated_at: now,
    }
}
