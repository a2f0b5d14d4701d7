//! Completion percentage for display.

use lf_protocol::{Case, CaseView, Stage, StageStatus};

/// Smallest percentage shown for a case that has started at all.
const MIN_VISIBLE_PERCENT: u8 = 3;

/// Derive a 0..=100 completion percentage from stage statuses.
///
/// Done stages count 1, in-progress stages 0.5. When nothing has a status
/// yet but `current_order` names a stage, the stages before it count as done
/// and the current one as half done. Non-zero results below
/// [`MIN_VISIBLE_PERCENT`] are raised to it.
pub fn compute_progress(stages: &[Stage], current_order: Option<u32>) -> u8 {
    if stages.is_empty() {
        return 0;
    }

    let mut sum: f64 = stages
        .iter()
        .map(|stage| match stage.status {
            StageStatus::Done => 1.0,
            StageStatus::InProgress => 0.5,
            StageStatus::Pending => 0.0,
        })
        .sum();

    if sum == 0.0 {
        if let Some(order) = current_order
            .filter(|order| *order > 0 && stages.iter().any(|stage| stage.order == *order))
        {
            let before = stages.iter().filter(|stage| stage.order < order).count();
            sum = before as f64 + 0.5;
        }
    }

    let percent = (100.0 * sum / stages.len() as f64).round().clamp(0.0, 100.0) as u8;

    if percent > 0 && percent < MIN_VISIBLE_PERCENT {
        MIN_VISIBLE_PERCENT
    } else {
        percent
    }
}

/// Wrap a case in the projection returned to callers.
pub fn case_view(case: Case) -> CaseView {
    CaseView {
        progress: compute_progress(&case.stages, case.current_stage_order),
        fully_done: case.is_fully_done(),
        case,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StageStatus::{Done, InProgress, Pending};

    fn stages(statuses: &[StageStatus]) -> Vec<Stage> {
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| Stage {
                key: format!("s{}", i + 1),
                name: format!("Stage {}", i + 1),
                order: i as u32 + 1,
                color: None,
                allowed_roles: Default::default(),
                status: *status,
                started_at: None,
                completed_at: None,
            })
            .collect()
    }

    #[test]
    fn test_half_credit_for_in_progress() {
        let list = stages(&[Done, Done, InProgress, Pending]);
        assert_eq!(compute_progress(&list, Some(3)), 63);
    }

    #[test]
    fn test_pointer_fallback_when_no_status() {
        let list = stages(&[Pending; 5]);
        assert_eq!(compute_progress(&list, Some(3)), 50);
    }

    #[test]
    fn test_unknown_pointer_gives_zero() {
        let list = stages(&[Pending; 5]);
        assert_eq!(compute_progress(&list, Some(42)), 0);
        assert_eq!(compute_progress(&list, Some(0)), 0);
        assert_eq!(compute_progress(&list, None), 0);
    }

    #[test]
    fn test_small_progress_is_raised_to_floor() {
        let mut statuses = vec![Pending; 40];
        statuses[0] = InProgress;
        // 0.5 / 40 = 1.25%
        assert_eq!(compute_progress(&stages(&statuses), None), 3);

        let mut statuses = vec![Pending; 100];
        statuses[0] = InProgress;
        assert_eq!(compute_progress(&stages(&statuses), None), 3);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(compute_progress(&[], Some(1)), 0);
        assert_eq!(compute_progress(&stages(&[Done, Done, Done]), None), 100);
    }
}
