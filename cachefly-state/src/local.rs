//! Local file backend
//!
//! State lives in a JSON file (default `cachefly.state.json`) next to a
//! `.lock` file. Writes go to a temporary file first and are renamed into
//! place, so a crash mid-write leaves the previous state intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::backend::{BackendError, BackendResult, StateBackend};
use crate::lock::LockInfo;
use crate::state::StateFile;

pub struct LocalBackend {
    state_path: PathBuf,
    lock_path: PathBuf,
}

impl LocalBackend {
    pub const DEFAULT_STATE_FILE: &'static str = "cachefly.state.json";

    pub fn new() -> Self {
        Self::with_path(Self::DEFAULT_STATE_FILE)
    }

    pub fn with_path(state_path: impl Into<PathBuf>) -> Self {
        let state_path = state_path.into();
        let lock_path = state_path.with_extension("lock");
        Self {
            state_path,
            lock_path,
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    async fn read_lock(&self) -> BackendResult<Option<LockInfo>> {
        match tokio::fs::read_to_string(&self.lock_path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content).map_err(|e| {
                BackendError::InvalidState(format!("Failed to parse lock file: {}", e))
            })?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::io("Failed to read lock file")(e)),
        }
    }

    /// Create the lock file, failing if it already exists
    async fn create_lock_file(&self, lock: &LockInfo) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_path)
            .await?;
        let content = serde_json::to_vec_pretty(lock)?;
        file.write_all(&content).await?;
        file.flush().await
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StateBackend for LocalBackend {
    async fn read_state(&self) -> BackendResult<Option<StateFile>> {
        let content = match tokio::fs::read_to_string(&self.state_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BackendError::io("Failed to read state file")(e)),
        };

        let state: StateFile = serde_json::from_str(&content).map_err(|e| {
            BackendError::InvalidState(format!(
                "Failed to parse {}: {}",
                self.state_path.display(),
                e
            ))
        })?;
        if state.version > StateFile::CURRENT_VERSION {
            return Err(BackendError::InvalidState(format!(
                "State file version {} is newer than supported version {}",
                state.version,
                StateFile::CURRENT_VERSION
            )));
        }
        Ok(Some(state))
    }

    async fn write_state(&self, state: &StateFile) -> BackendResult<()> {
        if let Some(existing) = self.read_state().await?
            && existing.lineage != state.lineage
        {
            return Err(BackendError::LineageMismatch {
                expected: existing.lineage,
                actual: state.lineage.clone(),
            });
        }

        let content = serde_json::to_string_pretty(state)?;
        let tmp_path = self.state_path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, content)
            .await
            .map_err(BackendError::io("Failed to write state file"))?;
        tokio::fs::rename(&tmp_path, &self.state_path)
            .await
            .map_err(BackendError::io("Failed to replace state file"))?;

        log::debug!(
            "Wrote state serial {} to {}",
            state.serial,
            self.state_path.display()
        );
        Ok(())
    }

    async fn acquire_lock(&self, operation: &str) -> BackendResult<LockInfo> {
        if let Some(existing) = self.read_lock().await? {
            if !existing.is_expired() {
                return Err(BackendError::locked(&existing));
            }
            log::warn!("Removing expired state lock {}", existing);
            tokio::fs::remove_file(&self.lock_path)
                .await
                .map_err(BackendError::io("Failed to remove expired lock file"))?;
        }

        let lock = LockInfo::new(operation);
        match self.create_lock_file(&lock).await {
            Ok(()) => Ok(lock),
            // Another process took the lock between the check and the create
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                match self.read_lock().await? {
                    Some(holder) => Err(BackendError::locked(&holder)),
                    None => Err(BackendError::io("Failed to create lock file")(e)),
                }
            }
            Err(e) => Err(BackendError::io("Failed to create lock file")(e)),
        }
    }

    async fn release_lock(&self, lock: &LockInfo) -> BackendResult<()> {
        let existing = self
            .read_lock()
            .await?
            .ok_or_else(|| BackendError::LockNotFound(lock.id.clone()))?;

        if existing.id != lock.id {
            return Err(BackendError::LockMismatch {
                expected: lock.id.clone(),
                actual: existing.id,
            });
        }

        tokio::fs::remove_file(&self.lock_path)
            .await
            .map_err(BackendError::io("Failed to remove lock file"))
    }

    async fn force_unlock(&self, lock_id: &str) -> BackendResult<()> {
        match self.read_lock().await? {
            None => return Err(BackendError::LockNotFound(lock_id.to_string())),
            Some(existing) if existing.id != lock_id => {
                return Err(BackendError::LockMismatch {
                    expected: lock_id.to_string(),
                    actual: existing.id,
                });
            }
            Some(_) => {}
        }

        tokio::fs::remove_file(&self.lock_path)
            .await
            .map_err(BackendError::io("Failed to remove lock file"))
    }
}
