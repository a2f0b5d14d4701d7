//! Case repository backed by one JSON file per case.
//!
//! Files live at `<dir>/<case-id>.json`. Each write goes to a temporary file
//! first and is renamed into place, so a failed write never leaves a
//! truncated case behind. The version check and the write happen under one
//! lock; other processes writing the same directory are not coordinated.

use super::{check_version, CaseRepository, RepositoryError, RepositoryResult};
use async_trait::async_trait;
use lf_protocol::Case;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use uuid::Uuid;
use walkdir::WalkDir;

#[derive(Debug)]
pub struct JsonFileCaseRepository {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileCaseRepository {
    /// Use `dir` for case files. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    async fn read_case(path: &Path) -> RepositoryResult<Option<Case>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(RepositoryError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| RepositoryError::Serialize {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn write_case(&self, case: &Case) -> RepositoryResult<()> {
        let path = self.path_for(case.id);
        let content =
            serde_json::to_string_pretty(case).map_err(|source| RepositoryError::Serialize {
                path: path.clone(),
                source,
            })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| RepositoryError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let tmp_path = path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(|source| RepositoryError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|source| RepositoryError::Io { path, source })
    }
}

#[async_trait]
impl CaseRepository for JsonFileCaseRepository {
    async fn load(&self, id: Uuid) -> RepositoryResult<Option<Case>> {
        Self::read_case(&self.path_for(id)).await
    }

    async fn insert(&self, case: &Case) -> RepositoryResult<()> {
        let _guard = self.write_lock.lock().await;
        if Self::read_case(&self.path_for(case.id)).await?.is_some() {
            return Err(RepositoryError::AlreadyExists(case.id));
        }
        self.write_case(case).await
    }

    async fn save(&self, case: &Case, expected_version: u64) -> RepositoryResult<()> {
        let _guard = self.write_lock.lock().await;
        let stored = Self::read_case(&self.path_for(case.id)).await?;
        check_version(case.id, stored.map(|c| c.version), expected_version)?;
        self.write_case(case).await
    }

    async fn list(&self) -> RepositoryResult<Vec<Case>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut cases = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| RepositoryError::Io {
                path: self.dir.clone(),
                source: e.into(),
            })?;

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            if let Some(case) = Self::read_case(path).await? {
                cases.push(case);
            }
        }

        cases.sort_by_key(|case| case.created_at);
        Ok(cases)
    }
}
