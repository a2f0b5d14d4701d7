//! Workflow engine.
//!
//! The WorkflowEngine turns a command on a case into either a fresh, updated
//! case or a typed rejection. It never mutates its input and performs no
//! I/O; persisting the result and serializing commands per case is the job
//! of the [`CaseManager`](crate::state::manager::CaseManager).
//!
//! Stage moves are checked in a fixed order: the acting principal must hold
//! a role of the target stage, then the case's jump policy must allow the
//! move. Stage work stops once a case is scheduled, delivered or approved;
//! a returned case can be reworked.

use crate::error::{WorkflowError, WorkflowResult};
use crate::ports::Authorizer;
use crate::state::delivery;
use crate::state::policy::{
    advance_target, apply_transition, can_transition, complete_stage, current_index, rewind_target,
};
use chrono::{DateTime, Utc};
use lf_protocol::{Case, DeliveryStatus, Principal, Stage};
use std::sync::Arc;
use tracing::debug;

/// Stateless command evaluator over cases.
pub struct WorkflowEngine {
    authorizer: Arc<dyn Authorizer>,

    /// When false the engine is a read-only view: every stage move is
    /// refused by the policy check.
    transitions_enabled: bool,
}

impl WorkflowEngine {
    /// Create an engine that accepts stage moves.
    ///
    /// # Arguments
    ///
    /// * `authorizer` - Decides whether a principal may act on a stage
    pub fn new(authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            authorizer,
            transitions_enabled: true,
        }
    }

    /// Create an engine that refuses every stage move.
    pub fn read_only(authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            authorizer,
            transitions_enabled: false,
        }
    }

    pub fn transitions_enabled(&self) -> bool {
        self.transitions_enabled
    }

    /// Move the current stage pointer to the stage with `target_order`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no stage has `target_order`
    /// - `Authorization` if the principal holds no role of the target stage
    /// - `InvalidTransition` if the jump policy refuses the move
    /// - `InvalidState` if the case is scheduled, delivered or approved
    pub fn transition(
        &self,
        case: &Case,
        principal: &Principal,
        target_order: u32,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Case> {
        require_open(case)?;
        let current = require_current(case)?;
        let target = case
            .stages
            .iter()
            .position(|stage| stage.order == target_order)
            .ok_or_else(|| WorkflowError::NotFound {
                kind: "Stage",
                id: target_order.to_string(),
            })?;

        self.move_to(case, principal, current, target, now)
    }

    /// Move to the next stage.
    pub fn advance(
        &self,
        case: &Case,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Case> {
        require_open(case)?;
        let current = require_current(case)?;
        self.move_to(case, principal, current, advance_target(current), now)
    }

    /// Move back to the previous stage.
    pub fn rewind(
        &self,
        case: &Case,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Case> {
        require_open(case)?;
        let current = require_current(case)?;
        match rewind_target(current) {
            Some(target) => self.move_to(case, principal, current, target, now),
            None => Err(WorkflowError::InvalidTransition {
                from: case.stages[current].order,
                to: 0,
                policy: case.jump_policy,
            }),
        }
    }

    /// Mark the current stage done without moving the pointer.
    ///
    /// # Errors
    ///
    /// - `Authorization` if the principal holds no role of the current stage
    /// - `InvalidState` if the stage is already done, or the case is
    ///   scheduled, delivered or approved
    pub fn complete_current_stage(
        &self,
        case: &Case,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Case> {
        require_open(case)?;
        let current = require_current(case)?;
        let stage = &case.stages[current];
        self.authorize(stage, principal)?;

        if stage.is_done() {
            return Err(WorkflowError::InvalidState(format!(
                "stage `{}` is already done",
                stage.key
            )));
        }

        let mut next = case.clone();
        complete_stage(&mut next.stages, current, now);
        next.current_stage_order = Some(stage.order);
        next.updated_at = now;
        Ok(next)
    }

    /// Schedule delivery. Every stage must be done.
    pub fn schedule(
        &self,
        case: &Case,
        date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Case> {
        delivery::mark_scheduled(case, date, case.is_fully_done(), now)
    }

    /// Record delivery. Every stage must be done.
    pub fn deliver(
        &self,
        case: &Case,
        date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Case> {
        delivery::mark_delivered(case, date, case.is_fully_done(), now)
    }

    /// Record that the case came back from the doctor.
    pub fn return_case(&self, case: &Case, now: DateTime<Utc>) -> WorkflowResult<Case> {
        delivery::mark_returned(case, now)
    }

    /// Record the assigned doctor's acknowledgment.
    ///
    /// # Errors
    ///
    /// - `Authorization` if `doctor_id` is not the case's doctor
    /// - `InvalidState` if the case is not delivered or already approved
    pub fn approve(
        &self,
        case: &Case,
        doctor_id: &str,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Case> {
        if case.doctor.id() != doctor_id {
            return Err(WorkflowError::Authorization {
                reason: format!("doctor `{}` is not assigned to case {}", doctor_id, case.id),
            });
        }
        delivery::mark_approved(case, doctor_id, now)
    }

    fn move_to(
        &self,
        case: &Case,
        principal: &Principal,
        current: usize,
        target: usize,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Case> {
        let from = case.stages[current].order;
        let to = case
            .stages
            .get(target)
            .map_or(target as u32 + 1, |stage| stage.order);
        let rejected = || WorkflowError::InvalidTransition {
            from,
            to,
            policy: case.jump_policy,
        };

        let target_stage = case.stages.get(target).ok_or_else(rejected)?;
        self.authorize(target_stage, principal)?;

        let allowed = can_transition(
            &case.stages,
            current,
            target,
            case.jump_policy,
            self.transitions_enabled,
        );
        debug!(
            case_id = %case.id,
            from,
            to = target_stage.order,
            policy = %case.jump_policy,
            allowed,
            "transition evaluated"
        );
        if !allowed {
            return Err(rejected());
        }

        let mut next = case.clone();
        let order =
            apply_transition(&mut next.stages, current, target, now).ok_or_else(rejected)?;
        next.current_stage_order = Some(order);
        next.updated_at = now;
        Ok(next)
    }

    fn authorize(&self, stage: &Stage, principal: &Principal) -> WorkflowResult<()> {
        if self.authorizer.may_act(&stage.allowed_roles, principal) {
            Ok(())
        } else {
            Err(WorkflowError::Authorization {
                reason: format!(
                    "user `{}` lacks a role allowed on stage `{}`",
                    principal.user_id, stage.key
                ),
            })
        }
    }
}

fn require_open(case: &Case) -> WorkflowResult<()> {
    if case.case_approval.approved {
        return Err(WorkflowError::InvalidState(format!(
            "case {} is approved; its stages are closed",
            case.id
        )));
    }
    match case.delivery.status {
        DeliveryStatus::Pending | DeliveryStatus::Returned => Ok(()),
        status => Err(WorkflowError::InvalidState(format!(
            "case {} is {}; stage work is closed",
            case.id, status
        ))),
    }
}

fn require_current(case: &Case) -> WorkflowResult<usize> {
    current_index(&case.stages, case.current_stage_order)
        .ok_or_else(|| WorkflowError::InvalidState("case has no stages".to_string()))
}
