//! Local file state backend.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::state::{PersistedState, StateStore};
use crate::{PublisherError, Result};

/// State stored as a JSON file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStateStore {
    path: PathBuf,
}

impl LocalStateStore {
    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for LocalStateStore {
    async fn load(&self) -> Result<PersistedState> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => PersistedState::from_json(&bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("State file {} not found, starting empty", self.path.display());
                Ok(PersistedState::new())
            }
            Err(e) => Err(PublisherError::StateUnavailable(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, state: &PersistedState) -> Result<()> {
        let bytes = state.to_json()?;
        let temp = self.temp_path();
        let write_err = |e: std::io::Error| {
            PublisherError::StateUnavailable(format!(
                "failed to write {}: {e}",
                self.path.display()
            ))
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
            }
        }
        tokio::fs::write(&temp, &bytes).await.map_err(write_err)?;
        tokio::fs::rename(&temp, &self.path).await.map_err(write_err)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
