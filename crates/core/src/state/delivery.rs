//! Delivery and approval sub-workflow.
//!
//! Delivery moves `pending -> scheduled -> delivered -> returned`, with a
//! direct `pending -> delivered` handoff and `returned -> scheduled` for a
//! redelivery. Approval is a separate flag the assigned doctor sets once the
//! case is delivered; it is terminal.
//!
//! These functions trust the caller's `fully_done` flag instead of looking
//! at the stages themselves.

use crate::error::{WorkflowError, WorkflowResult};
use chrono::{DateTime, Utc};
use lf_protocol::{Case, DeliveryStatus};

/// Whether the delivery state machine has an edge `from -> to`.
pub fn can_move_delivery(from: DeliveryStatus, to: DeliveryStatus) -> bool {
    use DeliveryStatus::*;

    matches!(
        (from, to),
        (Pending, Scheduled)
            | (Pending, Delivered)
            | (Scheduled, Delivered)
            | (Delivered, Returned)
            | (Returned, Scheduled)
    )
}

fn move_delivery(
    case: &Case,
    to: DeliveryStatus,
    date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> WorkflowResult<Case> {
    let from = case.delivery.status;
    if !can_move_delivery(from, to) {
        return Err(WorkflowError::InvalidState(format!(
            "delivery cannot move from {} to {}",
            from, to
        )));
    }

    let mut next = case.clone();
    next.delivery.status = to;
    next.delivery.date = date;
    next.updated_at = now;
    Ok(next)
}

/// Schedule delivery for `date`. The case must be fully done.
pub fn mark_scheduled(
    case: &Case,
    date: DateTime<Utc>,
    fully_done: bool,
    now: DateTime<Utc>,
) -> WorkflowResult<Case> {
    if !fully_done {
        return Err(WorkflowError::InvalidState(
            "cannot schedule delivery before every stage is done".to_string(),
        ));
    }
    move_delivery(case, DeliveryStatus::Scheduled, Some(date), now)
}

/// Record the delivery. `date` defaults to `now`.
pub fn mark_delivered(
    case: &Case,
    date: Option<DateTime<Utc>>,
    fully_done: bool,
    now: DateTime<Utc>,
) -> WorkflowResult<Case> {
    if !fully_done {
        return Err(WorkflowError::InvalidState(
            "cannot deliver before every stage is done".to_string(),
        ));
    }
    move_delivery(case, DeliveryStatus::Delivered, Some(date.unwrap_or(now)), now)
}

/// Record that the case came back. Refused once the doctor approved it.
pub fn mark_returned(case: &Case, now: DateTime<Utc>) -> WorkflowResult<Case> {
    if case.case_approval.approved {
        return Err(WorkflowError::InvalidState(
            "an approved case cannot be returned".to_string(),
        ));
    }
    let date = case.delivery.date;
    move_delivery(case, DeliveryStatus::Returned, date, now)
}

/// Record the doctor's acknowledgment.
///
/// Only allowed while delivered and not yet approved. A second call is
/// rejected and leaves `approved_at` as it was.
pub fn mark_approved(case: &Case, by: &str, now: DateTime<Utc>) -> WorkflowResult<Case> {
    if case.case_approval.approved {
        return Err(WorkflowError::InvalidState(
            "case is already approved".to_string(),
        ));
    }
    if case.delivery.status != DeliveryStatus::Delivered {
        return Err(WorkflowError::InvalidState(format!(
            "case can only be approved once delivered (delivery is {})",
            case.delivery.status
        )));
    }

    let mut next = case.clone();
    next.case_approval.approved = true;
    next.case_approval.approved_at = Some(now);
    next.case_approval.by = Some(by.to_string());
    next.updated_at = now;
    Ok(next)
}

/// Doctor-side listing filter.
///
/// "Received" is not a delivery status; it is read from the approval flag,
/// so both filters can be combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoctorCaseFilter {
    pub delivery_status: Option<DeliveryStatus>,
    pub received: Option<bool>,
}

impl DoctorCaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        self.delivery_status
            .map_or(true, |status| case.delivery.status == status)
            && self
                .received
                .map_or(true, |received| case.case_approval.approved == received)
    }
}

/// Cases assigned to `doctor_id` that pass `filter`.
pub fn doctor_cases<'a, I>(cases: I, doctor_id: &str, filter: &DoctorCaseFilter) -> Vec<&'a Case>
where
    I: IntoIterator<Item = &'a Case>,
{
    cases
        .into_iter()
        .filter(|case| case.doctor.id() == doctor_id && filter.matches(case))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::snapshot::create_case;
    use lf_protocol::{DoctorRef, InitialStage, JumpPolicy, LabType};

    fn case_for(doctor: &str) -> Case {
        let lab_type = LabType {
            id: "crown".to_string(),
            name: "Crown".to_string(),
            stages: Vec::new(),
        };
        create_case(
            &lab_type,
            DoctorRef::Unresolved(doctor.to_string()),
            JumpPolicy::ForwardAny,
            InitialStage::AllPending,
            Utc::now(),
        )
    }

    fn delivered_case() -> Case {
        let now = Utc::now();
        let case = case_for("doc-1");
        let case = mark_scheduled(&case, now, true, now).unwrap();
        mark_delivered(&case, None, true, now).unwrap()
    }

    #[test]
    fn test_delivery_edges() {
        use DeliveryStatus::*;
        assert!(can_move_delivery(Pending, Scheduled));
        assert!(can_move_delivery(Scheduled, Delivered));
        assert!(can_move_delivery(Delivered, Returned));
        assert!(can_move_delivery(Returned, Scheduled));
        assert!(!can_move_delivery(Scheduled, Scheduled));
        assert!(!can_move_delivery(Delivered, Pending));
        assert!(!can_move_delivery(Pending, Returned));
    }

    #[test]
    fn test_schedule_requires_fully_done() {
        let case = case_for("doc-1");
        let result = mark_scheduled(&case, Utc::now(), false, Utc::now());
        assert!(matches!(result, Err(WorkflowError::InvalidState(_))));
    }

    #[test]
    fn test_delivered_defaults_date_to_now() {
        let now = Utc::now();
        let case = mark_delivered(&case_for("doc-1"), None, true, now).unwrap();
        assert_eq!(case.delivery.status, DeliveryStatus::Delivered);
        assert_eq!(case.delivery.date, Some(now));
    }

    #[test]
    fn test_approve_requires_delivered() {
        let case = case_for("doc-1");
        let result = mark_approved(&case, "doc-1", Utc::now());
        assert!(matches!(result, Err(WorkflowError::InvalidState(_))));

        let scheduled = mark_scheduled(&case, Utc::now(), true, Utc::now()).unwrap();
        assert!(mark_approved(&scheduled, "doc-1", Utc::now()).is_err());
    }

    #[test]
    fn test_approve_twice_keeps_first_timestamp() {
        let first = Utc::now();
        let approved = mark_approved(&delivered_case(), "doc-1", first).unwrap();
        assert!(approved.case_approval.approved);
        assert_eq!(approved.case_approval.by.as_deref(), Some("doc-1"));

        let later = first + chrono::Duration::minutes(10);
        let result = mark_approved(&approved, "doc-1", later);
        assert!(matches!(result, Err(WorkflowError::InvalidState(_))));
        assert_eq!(approved.case_approval.approved_at, Some(first));
    }

    #[test]
    fn test_approved_case_cannot_be_returned() {
        let now = Utc::now();
        let approved = mark_approved(&delivered_case(), "doc-1", now).unwrap();
        assert!(matches!(
            mark_returned(&approved, now),
            Err(WorkflowError::InvalidState(_))
        ));

        let returned = mark_returned(&delivered_case(), now).unwrap();
        assert_eq!(returned.delivery.status, DeliveryStatus::Returned);
    }

    #[test]
    fn test_doctor_scope_and_received_filter() {
        let now = Utc::now();
        let pending = case_for("doc-1");
        let delivered = delivered_case();
        let received = mark_approved(&delivered_case(), "doc-1", now).unwrap();
        let other_doctor = case_for("doc-2");
        let all = vec![pending, delivered, received, other_doctor];

        let everything = doctor_cases(&all, "doc-1", &DoctorCaseFilter::default());
        assert_eq!(everything.len(), 3);

        let delivered_only = DoctorCaseFilter {
            delivery_status: Some(DeliveryStatus::Delivered),
            received: None,
        };
        assert_eq!(doctor_cases(&all, "doc-1", &delivered_only).len(), 2);

        let delivered_not_received = DoctorCaseFilter {
            delivery_status: Some(DeliveryStatus::Delivered),
            received: Some(false),
        };
        let found = doctor_cases(&all, "doc-1", &delivered_not_received);
        assert_eq!(found.len(), 1);
        assert!(!found[0].case_approval.approved);

        assert!(doctor_cases(&all, "doc-3", &DoctorCaseFilter::default()).is_empty());
    }
}
