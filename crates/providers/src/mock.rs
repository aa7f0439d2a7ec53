//! Scripted `ChatModel` for decorator tests.

use async_trait::async_trait;
use parley_core::error::ProviderError;
use parley_core::message::Message;
use parley_core::model::{ChatModel, ModelResponse};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Returns the scripted results in order; the last one repeats.
pub struct ScriptedModel {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    call_count: Mutex<usize>,
}

impl ScriptedModel {
    pub fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            call_count: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted/test-model"
    }

    async fn respond(&self, _messages: &[Message]) -> Result<ModelResponse, ProviderError> {
        *self.call_count.lock().unwrap() += 1;
        let mut script = self.script.lock().unwrap();
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.expect("empty script")
            .map(|content| ModelResponse::text("test-model", content))
    }
}
