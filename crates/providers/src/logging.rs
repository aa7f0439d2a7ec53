//! Logging decorator: records every call's outcome without touching it.

use async_trait::async_trait;
use parley_core::error::ProviderError;
use parley_core::message::Message;
use parley_core::model::{ChatModel, ModelResponse};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub struct LoggingModel {
    inner: Arc<dyn ChatModel>,
}

impl LoggingModel {
    pub fn new(inner: Arc<dyn ChatModel>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ChatModel for LoggingModel {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn respond(&self, messages: &[Message]) -> Result<ModelResponse, ProviderError> {
        let started = Instant::now();
        let result = self.inner.respond(messages).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => {
                let usage = response.usage.unwrap_or_default();
                info!(
                    model = %self.inner.name(),
                    responded_as = %response.model,
                    messages = messages.len(),
                    duration_ms,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    outcome = "ok",
                    "Model call completed"
                );
            }
            Err(e) => {
                warn!(
                    model = %self.inner.name(),
                    messages = messages.len(),
                    duration_ms,
                    outcome = "error",
                    error = %e,
                    "Model call failed"
                );
            }
        }

        result
    }
}
