//! ChatModel trait: the abstraction over callable language models.
//!
//! A `ChatModel` turns an ordered message list into a single text response.
//! Raw provider clients (OpenAI, Gemini) implement it, and so do the
//! decorators layered on top of them (logging, retry), so the reasoning
//! engine never knows which provider or how many wrappers sit behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ProviderError;
use crate::message::Message;

/// What a model is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelPurpose {
    /// The final free-text (or structured step) response of the agent; may stream.
    Response,
    /// A structured selection that must honor the requested schema; never streams.
    Selection,
}

/// A complete response from a model call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The generated text (JSON text when a response schema was attached)
    pub content: String,

    /// Token usage statistics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

impl ModelResponse {
    pub fn text(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
            model: model.into(),
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Side channel for incremental output.
///
/// `on_begin` fires once at the start of every attempt (so a retried call
/// restarts the stream), `on_text` fires for each fragment as it arrives.
#[derive(Clone)]
pub struct StreamCallbacks {
    on_begin: Arc<dyn Fn() + Send + Sync>,
    on_text: Arc<dyn Fn(&str) + Send + Sync>,
}

impl StreamCallbacks {
    pub fn new(
        on_begin: impl Fn() + Send + Sync + 'static,
        on_text: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_begin: Arc::new(on_begin),
            on_text: Arc::new(on_text),
        }
    }

    pub fn begin(&self) {
        (self.on_begin)();
    }

    pub fn text(&self, fragment: &str) {
        (self.on_text)(fragment);
    }
}

impl std::fmt::Debug for StreamCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamCallbacks").finish_non_exhaustive()
    }
}

/// The core ChatModel trait.
///
/// The engine calls `respond()` without knowing which provider, schema
/// constraint or decorator chain is behind it.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// A human-readable name (e.g., "openai/gpt-4.1").
    fn name(&self) -> &str;

    /// Send the conversation and get a complete response.
    async fn respond(&self, messages: &[Message]) -> std::result::Result<ModelResponse, ProviderError>;
}

#[async_trait]
impl<M: ChatModel + ?Sized> ChatModel for Arc<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn respond(&self, messages: &[Message]) -> std::result::Result<ModelResponse, ProviderError> {
        (**self).respond(messages).await
    }
}
