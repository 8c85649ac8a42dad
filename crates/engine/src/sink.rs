// ABOUTME: Persistence for produced artifacts. Writes named byte streams into an output directory.
// ABOUTME: File names are sanitized before they reach the filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::EngineError;
use crate::naming::sanitize_filename;

#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Persist `bytes` under `filename`, returning where they landed.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, EngineError>;
}

#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, EngineError> {
        let name = sanitize_filename(filename);
        let path = self.dir.join(&name);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| EngineError::io(self.dir.display().to_string(), "Save", e))?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| EngineError::io(path.display().to_string(), "Save", e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "saved artifact");
        Ok(path)
    }
}
