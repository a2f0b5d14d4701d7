//! Transition policy engine.
//!
//! [`can_transition`] is the single decision point for every stage move.
//! Advance and rewind are jumps to `current + 1` / `current - 1` and go
//! through the same function.

use chrono::{DateTime, Utc};
use lf_protocol::{JumpPolicy, Stage, StageStatus};

/// True when every stage strictly before `index` is done.
pub fn chain_done_until(stages: &[Stage], index: usize) -> bool {
    stages.iter().take(index).all(Stage::is_done)
}

/// Decide whether a move from `current` to `target` (stage positions) is
/// permitted.
///
/// `transition_requested` is false for read-only callers; nothing is ever
/// permitted for them. No-op moves and out-of-range targets are refused.
pub fn can_transition(
    stages: &[Stage],
    current: usize,
    target: usize,
    policy: JumpPolicy,
    transition_requested: bool,
) -> bool {
    if !transition_requested || target == current || target >= stages.len() {
        return false;
    }

    let is_forward = target > current;

    match policy {
        JumpPolicy::Disabled => false,
        JumpPolicy::NextOnly => target == current + 1,
        JumpPolicy::ForwardAny => is_forward,
        JumpPolicy::ForwardWhenPreviousDone => is_forward && chain_done_until(stages, target),
        JumpPolicy::BothWhenPreviousDone => chain_done_until(stages, target),
    }
}

/// [`can_transition`] with a policy given by name. Unknown names refuse.
pub fn can_transition_named(
    stages: &[Stage],
    current: usize,
    target: usize,
    policy_name: &str,
    transition_requested: bool,
) -> bool {
    match policy_name.parse::<JumpPolicy>() {
        Ok(policy) => can_transition(stages, current, target, policy, transition_requested),
        Err(_) => false,
    }
}

/// Target position for an advance.
pub fn advance_target(current: usize) -> usize {
    current + 1
}

/// Target position for a rewind, `None` at the first stage.
pub fn rewind_target(current: usize) -> Option<usize> {
    current.checked_sub(1)
}

/// Position of the current stage.
///
/// Uses `current_order` when it names a stage of the list, otherwise derives
/// the position from statuses: the first in-progress stage, else the first
/// stage not done, else the last stage. `None` only for an empty list.
pub fn current_index(stages: &[Stage], current_order: Option<u32>) -> Option<usize> {
    if stages.is_empty() {
        return None;
    }

    current_order
        .and_then(|order| stages.iter().position(|stage| stage.order == order))
        .or_else(|| {
            stages
                .iter()
                .position(|stage| stage.status == StageStatus::InProgress)
        })
        .or_else(|| stages.iter().position(|stage| !stage.is_done()))
        .or(Some(stages.len() - 1))
}

/// Apply an accepted move and return the new current order.
///
/// Moving forward closes the stage being left (done, `completed_at`
/// stamped if unset); stages jumped over keep their status. Moving backward
/// resets every stage after the target to pending and clears their
/// timestamps. Either way the target becomes in progress with `started_at`
/// stamped if unset and `completed_at` cleared.
///
/// Callers must have checked the move with [`can_transition`]. Returns the
/// new current order, or `None` without touching the stages when `target`
/// is out of range.
pub fn apply_transition(
    stages: &mut [Stage],
    current: usize,
    target: usize,
    now: DateTime<Utc>,
) -> Option<u32> {
    if target >= stages.len() {
        return None;
    }

    if target > current {
        if let Some(leaving) = stages.get_mut(current) {
            leaving.status = StageStatus::Done;
            leaving.completed_at.get_or_insert(now);
        }
    } else {
        for later in stages.iter_mut().skip(target + 1) {
            later.status = StageStatus::Pending;
            later.started_at = None;
            later.completed_at = None;
        }
    }

    let entered = stages.get_mut(target)?;
    entered.status = StageStatus::InProgress;
    entered.started_at.get_or_insert(now);
    entered.completed_at = None;
    Some(entered.order)
}

/// Mark the stage at `index` done without moving the pointer.
pub fn complete_stage(stages: &mut [Stage], index: usize, now: DateTime<Utc>) {
    if let Some(stage) = stages.get_mut(index) {
        stage.status = StageStatus::Done;
        stage.started_at.get_or_insert(now);
        stage.completed_at.get_or_insert(now);
    }
}
