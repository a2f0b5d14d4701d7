//! Test fixtures for creating sample Types, projects and managers.

use async_trait::async_trait;
use lf_core::repository::{
    CaseRepository, InMemoryCaseRepository, RepositoryError, RepositoryResult,
};
use lf_core::state::manager::CaseManager;
use lf_core::template_store::TemplateStore;
use lf_protocol::{Case, Event, GlobalConfig, LabType, Principal, StageTemplate};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Build a Type whose stages are named `s1..sN`, one entry of `roles` per
/// stage. An empty role list leaves the stage unrestricted.
#[allow(dead_code)]
pub fn lab_type(id: &str, roles: &[&[&str]]) -> LabType {
    LabType {
        id: id.to_string(),
        name: id.to_uppercase(),
        stages: roles
            .iter()
            .enumerate()
            .map(|(i, allowed)| StageTemplate {
                key: format!("s{}", i + 1),
                name: format!("Stage {}", i + 1),
                order: i as u32 + 1,
                color: None,
                allowed_roles: allowed.iter().map(|r| r.to_string()).collect(),
            })
            .collect(),
    }
}

/// Three unrestricted stages.
#[allow(dead_code)]
pub fn three_stage_type() -> LabType {
    lab_type("crown", &[&[], &[], &[]])
}

#[allow(dead_code)]
pub fn store_with(types: Vec<LabType>) -> TemplateStore {
    TemplateStore::from_types(types).expect("fixture types should be valid")
}

/// A CaseManager over `repository` with default config.
#[allow(dead_code)]
pub fn manager_with(
    types: Vec<LabType>,
    repository: Arc<dyn CaseRepository>,
) -> (CaseManager, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(100);
    let manager = CaseManager::from_config(
        &GlobalConfig::default(),
        Arc::new(store_with(types)),
        repository,
        tx,
    );
    (manager, rx)
}

#[allow(dead_code)]
pub fn technician() -> Principal {
    Principal::new("tech-1", ["technician"])
}

/// Repository that delegates to memory and can be switched to fail saves.
#[derive(Debug, Default)]
pub struct FlakyRepository {
    inner: InMemoryCaseRepository,
    fail_saves: AtomicBool,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CaseRepository for FlakyRepository {
    async fn load(&self, id: Uuid) -> RepositoryResult<Option<Case>> {
        self.inner.load(id).await
    }

    async fn insert(&self, case: &Case) -> RepositoryResult<()> {
        self.inner.insert(case).await
    }

    async fn save(&self, case: &Case, expected_version: u64) -> RepositoryResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RepositoryError::Io {
                path: format!("{}.json", case.id).into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.save(case, expected_version).await
    }

    async fn list(&self) -> RepositoryResult<Vec<Case>> {
        self.inner.list().await
    }
}

/// Create a temporary project directory with a `.labflow/` configuration
/// holding one three-stage Type.
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let lf_dir = temp_dir.path().join(".labflow");

    std::fs::create_dir_all(lf_dir.join("types"))?;
    std::fs::create_dir_all(lf_dir.join("cases"))?;

    std::fs::write(
        lf_dir.join("config.toml"),
        "default-jump-policy = \"forward-when-previous-done\"\n",
    )?;

    let type_yaml = r#"
id: crown
name: Crown
stages:
  - { key: scan, name: Scan, order: 1 }
  - { key: design, name: Design, order: 2, allowed_roles: [designer] }
  - { key: milling, name: Milling, order: 3, allowed_roles: [technician] }
"#;
    std::fs::write(lf_dir.join("types/crown.yaml"), type_yaml)?;

    Ok(temp_dir)
}
