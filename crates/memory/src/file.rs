//! File-backed scratch pad: one plain-text file, rewritten wholesale.
//!
//! Storage location: `<data_dir>/scratchpad.txt`
//!
//! A missing file reads as empty and is created on the first successful
//! rewrite. Writes go to a sibling temp file first and are renamed into
//! place, so a crash mid-write never leaves a truncated pad.

use async_trait::async_trait;
use parley_core::error::MemoryError;
use parley_core::memory::{ScratchPad, apply_rewrite};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

pub struct FileScratchPad {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileScratchPad {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<String, MemoryError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(MemoryError::Storage(format!(
                "Failed to read scratchpad {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn persist(&self, content: &str) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                MemoryError::Storage(format!("Failed to create scratchpad directory: {e}"))
            })?;
        }

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to write scratchpad: {e}")))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to replace scratchpad: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ScratchPad for FileScratchPad {
    async fn content(&self) -> Result<String, MemoryError> {
        self.read().await
    }

    async fn rewrite(&self, old_text: &str, new_text: &str) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock().await;

        let current = self.read().await?;
        let updated = apply_rewrite(&current, old_text, new_text)?;
        self.persist(&updated).await?;

        debug!(path = %self.path.display(), bytes = updated.len(), "Scratchpad rewritten");
        Ok(())
    }
}
