//! In-memory scratch pad: non-persistent, for tests and ephemeral sessions.

use async_trait::async_trait;
use parley_core::error::MemoryError;
use parley_core::memory::{ScratchPad, apply_rewrite};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct InMemoryScratchPad {
    content: Mutex<String>,
}

impl InMemoryScratchPad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing content.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: Mutex::new(content.into()),
        }
    }
}

#[async_trait]
impl ScratchPad for InMemoryScratchPad {
    async fn content(&self) -> Result<String, MemoryError> {
        Ok(self.content.lock().await.clone())
    }

    async fn rewrite(&self, old_text: &str, new_text: &str) -> Result<(), MemoryError> {
        let mut content = self.content.lock().await;
        *content = apply_rewrite(&content, old_text, new_text)?;
        Ok(())
    }
}
