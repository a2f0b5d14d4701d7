//! Case manager for coordinating workflow commands.
//!
//! The CaseManager is the entry point for every command on a case. It keeps
//! a registry of loaded cases, serializes commands per case, persists each
//! accepted change before committing it in memory, and reports the outcome
//! on the events channel.

use crate::engine::WorkflowEngine;
use crate::error::{WorkflowError, WorkflowResult};
use crate::ports::{RoleAuthorizer, TypeLookup};
use crate::repository::CaseRepository;
use crate::state::delivery::{doctor_cases, DoctorCaseFilter};
use crate::state::progress::{case_view, compute_progress};
use crate::state::snapshot::create_case;
use chrono::{DateTime, Utc};
use lf_protocol::{
    Case, CaseView, DoctorRef, Event, GlobalConfig, InitialStage, JumpPolicy, Op, Principal,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

/// Manages all loaded cases.
///
/// Each case sits behind its own mutex, held for the whole
/// evaluate, persist and commit cycle of a command. Two commands on the
/// same case therefore never interleave, while commands on different cases
/// run independently.
pub struct CaseManager {
    /// Registry of loaded cases, indexed by their UUID.
    cases: Arc<Mutex<HashMap<Uuid, Arc<Mutex<Case>>>>>,

    engine: Arc<WorkflowEngine>,

    types: Arc<dyn TypeLookup>,

    repository: Arc<dyn CaseRepository>,

    /// Status of the first stage of newly created cases.
    initial_stage: InitialStage,

    /// Channel for sending events to the caller.
    events_tx: mpsc::Sender<Event>,
}

impl CaseManager {
    /// Create a new CaseManager.
    ///
    /// # Arguments
    ///
    /// * `engine` - Evaluates commands
    /// * `types` - Resolves Types when cases are created
    /// * `repository` - Durable case storage
    /// * `initial_stage` - Status of the first stage of new cases
    /// * `events_tx` - Channel for sending events to the caller
    pub fn new(
        engine: WorkflowEngine,
        types: Arc<dyn TypeLookup>,
        repository: Arc<dyn CaseRepository>,
        initial_stage: InitialStage,
        events_tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            cases: Arc::new(Mutex::new(HashMap::new())),
            engine: Arc::new(engine),
            types,
            repository,
            initial_stage,
            events_tx,
        }
    }

    /// Create a CaseManager configured from the project's global config.
    pub fn from_config(
        config: &GlobalConfig,
        types: Arc<dyn TypeLookup>,
        repository: Arc<dyn CaseRepository>,
        events_tx: mpsc::Sender<Event>,
    ) -> Self {
        let authorizer = RoleAuthorizer::new(config.superuser_roles.iter().cloned());
        Self::new(
            WorkflowEngine::new(Arc::new(authorizer)),
            types,
            repository,
            config.initial_stage,
            events_tx,
        )
    }

    /// Create a case from the current stage templates of `type_id`.
    ///
    /// Later edits to the Type never reach the created case.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the Type does not exist
    /// - `Persistence` if the case could not be stored
    pub async fn create_case(
        &self,
        type_id: &str,
        doctor: DoctorRef,
        jump_policy: JumpPolicy,
    ) -> WorkflowResult<CaseView> {
        let result = self.try_create_case(type_id, doctor, jump_policy).await;
        if let Err(e) = &result {
            self.reject(None, e).await;
        }
        result
    }

    async fn try_create_case(
        &self,
        type_id: &str,
        doctor: DoctorRef,
        jump_policy: JumpPolicy,
    ) -> WorkflowResult<CaseView> {
        let lab_type = self
            .types
            .lookup_type(type_id)
            .ok_or_else(|| WorkflowError::type_not_found(type_id))?;

        let case = create_case(&lab_type, doctor, jump_policy, self.initial_stage, Utc::now());
        self.repository.insert(&case).await?;

        self.cases
            .lock()
            .await
            .insert(case.id, Arc::new(Mutex::new(case.clone())));

        info!(
            case_id = %case.id,
            type_id = %case.type_id,
            doctor = case.doctor.id(),
            policy = %case.jump_policy,
            "case created"
        );
        let _ = self
            .events_tx
            .send(Event::CaseCreated {
                case_id: case.id,
                type_id: case.type_id.clone(),
                stage_count: case.stages.len(),
            })
            .await;

        Ok(case_view(case))
    }

    /// Current state of a case, loading it from the repository if needed.
    pub async fn get_case(&self, case_id: Uuid) -> WorkflowResult<CaseView> {
        let entry = self.entry(case_id).await?;
        let case = entry.lock().await.clone();
        Ok(case_view(case))
    }

    /// Cases assigned to `doctor_id` that pass `filter`, oldest first.
    pub async fn list_for_doctor(
        &self,
        doctor_id: &str,
        filter: &DoctorCaseFilter,
    ) -> WorkflowResult<Vec<CaseView>> {
        let stored = self.repository.list().await?;
        Ok(doctor_cases(&stored, doctor_id, filter)
            .into_iter()
            .cloned()
            .map(case_view)
            .collect())
    }

    /// Move the current stage pointer to the stage with `target_order`.
    pub async fn transition(
        &self,
        case_id: Uuid,
        principal: &Principal,
        target_order: u32,
    ) -> WorkflowResult<CaseView> {
        self.apply(
            case_id,
            |engine, case, now| engine.transition(case, principal, target_order, now),
            stage_changed,
        )
        .await
    }

    /// Move to the next stage.
    pub async fn advance(&self, case_id: Uuid, principal: &Principal) -> WorkflowResult<CaseView> {
        self.apply(
            case_id,
            |engine, case, now| engine.advance(case, principal, now),
            stage_changed,
        )
        .await
    }

    /// Move back to the previous stage.
    pub async fn rewind(&self, case_id: Uuid, principal: &Principal) -> WorkflowResult<CaseView> {
        self.apply(
            case_id,
            |engine, case, now| engine.rewind(case, principal, now),
            stage_changed,
        )
        .await
    }

    /// Mark the current stage done without moving the pointer.
    pub async fn complete_current_stage(
        &self,
        case_id: Uuid,
        principal: &Principal,
    ) -> WorkflowResult<CaseView> {
        self.apply(
            case_id,
            |engine, case, now| engine.complete_current_stage(case, principal, now),
            |_, next| Event::StageCompleted {
                case_id: next.id,
                order: next.current_stage_order.unwrap_or_default(),
                progress: compute_progress(&next.stages, next.current_stage_order),
                fully_done: next.is_fully_done(),
            },
        )
        .await
    }

    /// Schedule delivery of a fully done case.
    pub async fn schedule(&self, case_id: Uuid, date: DateTime<Utc>) -> WorkflowResult<CaseView> {
        self.apply(
            case_id,
            |engine, case, now| engine.schedule(case, date, now),
            delivery_updated,
        )
        .await
    }

    /// Record delivery of a fully done case. `date` defaults to now.
    pub async fn deliver(
        &self,
        case_id: Uuid,
        date: Option<DateTime<Utc>>,
    ) -> WorkflowResult<CaseView> {
        self.apply(
            case_id,
            |engine, case, now| engine.deliver(case, date, now),
            delivery_updated,
        )
        .await
    }

    /// Record that a delivered case came back.
    pub async fn return_case(&self, case_id: Uuid) -> WorkflowResult<CaseView> {
        self.apply(
            case_id,
            |engine, case, now| engine.return_case(case, now),
            delivery_updated,
        )
        .await
    }

    /// Record the assigned doctor's acknowledgment of a delivered case.
    pub async fn approve(&self, case_id: Uuid, doctor_id: &str) -> WorkflowResult<CaseView> {
        self.apply(
            case_id,
            |engine, case, now| engine.approve(case, doctor_id, now),
            |_, next| Event::CaseApproved {
                case_id: next.id,
                by: next.case_approval.by.clone().unwrap_or_default(),
            },
        )
        .await
    }

    /// Route a protocol command to the matching method.
    ///
    /// `principal` is only consulted by stage moves; delivery commands and
    /// approval carry their own identity checks.
    pub async fn dispatch(&self, op: Op, principal: &Principal) -> WorkflowResult<CaseView> {
        match op {
            Op::CreateCase {
                type_id,
                doctor,
                jump_policy,
            } => self.create_case(&type_id, doctor, jump_policy).await,
            Op::Transition {
                case_id,
                target_order,
            } => self.transition(case_id, principal, target_order).await,
            Op::Advance { case_id } => self.advance(case_id, principal).await,
            Op::Rewind { case_id } => self.rewind(case_id, principal).await,
            Op::CompleteStage { case_id } => self.complete_current_stage(case_id, principal).await,
            Op::Schedule { case_id, date } => self.schedule(case_id, date).await,
            Op::Deliver { case_id, date } => self.deliver(case_id, date).await,
            Op::ReturnCase { case_id } => self.return_case(case_id).await,
            Op::Approve { case_id, doctor_id } => self.approve(case_id, &doctor_id).await,
        }
    }

    /// Get the number of loaded cases.
    pub async fn case_count(&self) -> usize {
        self.cases.lock().await.len()
    }

    /// Evaluate, persist, commit, notify. A rejection at any step leaves the
    /// in-memory case as it was.
    async fn apply<C, E>(&self, case_id: Uuid, command: C, event: E) -> WorkflowResult<CaseView>
    where
        C: FnOnce(&WorkflowEngine, &Case, DateTime<Utc>) -> WorkflowResult<Case>,
        E: FnOnce(&Case, &Case) -> Event,
    {
        let result = self.try_apply(case_id, command, event).await;
        if let Err(e) = &result {
            self.reject(Some(case_id), e).await;
        }
        result
    }

    async fn try_apply<C, E>(&self, case_id: Uuid, command: C, event: E) -> WorkflowResult<CaseView>
    where
        C: FnOnce(&WorkflowEngine, &Case, DateTime<Utc>) -> WorkflowResult<Case>,
        E: FnOnce(&Case, &Case) -> Event,
    {
        let entry = self.entry(case_id).await?;
        let mut current = entry.lock().await;

        let mut next = command(&*self.engine, &*current, Utc::now())?;
        next.version = current.version + 1;
        self.repository.save(&next, current.version).await?;

        let event = event(&*current, &next);
        *current = next.clone();
        drop(current);

        info!(case_id = %case_id, version = next.version, "case updated");
        let _ = self.events_tx.send(event).await;

        Ok(case_view(next))
    }

    async fn entry(&self, case_id: Uuid) -> WorkflowResult<Arc<Mutex<Case>>> {
        if let Some(entry) = self.cases.lock().await.get(&case_id) {
            return Ok(Arc::clone(entry));
        }

        // The registry is not locked while loading; another command may
        // load the same case meanwhile, and the first one registered wins.
        let case = self
            .repository
            .load(case_id)
            .await?
            .ok_or_else(|| WorkflowError::case_not_found(case_id))?;

        let mut cases = self.cases.lock().await;
        let entry = cases
            .entry(case_id)
            .or_insert_with(|| Arc::new(Mutex::new(case)));
        Ok(Arc::clone(entry))
    }

    async fn reject(&self, case_id: Option<Uuid>, error: &WorkflowError) {
        warn!(case_id = ?case_id, error = %error, "command rejected");
        let _ = self
            .events_tx
            .send(Event::CommandRejected {
                case_id,
                reason: error.to_string(),
            })
            .await;
    }
}

fn stage_changed(prev: &Case, next: &Case) -> Event {
    Event::StageChanged {
        case_id: next.id,
        from_order: prev.current_stage_order,
        to_order: next.current_stage_order.unwrap_or_default(),
        progress: compute_progress(&next.stages, next.current_stage_order),
    }
}

fn delivery_updated(_prev: &Case, next: &Case) -> Event {
    Event::DeliveryUpdated {
        case_id: next.id,
        status: next.delivery.status,
    }
}
