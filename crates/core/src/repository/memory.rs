//! In-memory case repository.

use super::{check_version, CaseRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use lf_protocol::Case;
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Keeps cases in a map. Useful for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemoryCaseRepository {
    cases: Mutex<HashMap<Uuid, Case>>,
}

impl InMemoryCaseRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CaseRepository for InMemoryCaseRepository {
    async fn load(&self, id: Uuid) -> RepositoryResult<Option<Case>> {
        Ok(self.cases.lock().await.get(&id).cloned())
    }

    async fn insert(&self, case: &Case) -> RepositoryResult<()> {
        let mut cases = self.cases.lock().await;
        if cases.contains_key(&case.id) {
            return Err(RepositoryError::AlreadyExists(case.id));
        }
        cases.insert(case.id, case.clone());
        Ok(())
    }

    async fn save(&self, case: &Case, expected_version: u64) -> RepositoryResult<()> {
        let mut cases = self.cases.lock().await;
        check_version(
            case.id,
            cases.get(&case.id).map(|stored| stored.version),
            expected_version,
        )?;
        cases.insert(case.id, case.clone());
        Ok(())
    }

    async fn list(&self) -> RepositoryResult<Vec<Case>> {
        let mut cases: Vec<Case> = self.cases.lock().await.values().cloned().collect();
        cases.sort_by_key(|case| case.created_at);
        Ok(cases)
    }
}
