//! OpenAI chat-completions client.
//!
//! Works with OpenAI and any endpoint that speaks the same
//! `/chat/completions` protocol (OpenRouter, vLLM, Ollama, proxies).
//!
//! Supports:
//! - Non-streaming and streaming (SSE) completions
//! - Structured output via `response_format: json_schema`
//! - Reasoning effort for reasoning models

use async_trait::async_trait;
use futures::StreamExt;
use parley_core::error::{ModelBuildError, ProviderError};
use parley_core::message::{Message, Role};
use parley_core::model::{ChatModel, ModelResponse, StreamCallbacks, Usage};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, trace};

use crate::http::{self, SseBuffer};
use crate::schema::ResponseSchema;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// How much hidden reasoning a reasoning model should spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl FromStr for ReasoningEffort {
    type Err = ModelBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            other => Err(ModelBuildError::UnknownReasoningEffort(other.to_string())),
        }
    }
}

/// An OpenAI chat-completions model.
pub struct OpenAiModel {
    name: String,
    model: String,
    base_url: String,
    api_key: String,
    headers: HeaderMap,
    temperature: Option<f32>,
    reasoning_effort: Option<ReasoningEffort>,
    schema: Option<ResponseSchema>,
    stream: Option<StreamCallbacks>,
    client: reqwest::Client,
}

impl OpenAiModel {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, client: reqwest::Client) -> Self {
        let model = model.into();
        Self {
            name: format!("openai/{model}"),
            model,
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            headers: HeaderMap::new(),
            temperature: None,
            reasoning_effort: None,
            schema: None,
            stream: None,
            client,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = Some(effort);
        self
    }

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_stream(mut self, callbacks: StreamCallbacks) -> Self {
        self.stream = Some(callbacks);
        self
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                    // No tool_call_id to attach, so observations travel as user turns
                    Role::Tool => "user".into(),
                },
                content: Some(m.content.clone()),
            })
            .collect()
    }

    fn request_body(&self, messages: &[Message], stream: bool) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(messages),
            "stream": stream,
        });

        if stream {
            body["stream_options"] = serde_json::json!({ "include_usage": true });
        }

        if let Some(t) = self.temperature {
            body["temperature"] = serde_json::json!(t);
        }

        if let Some(effort) = self.reasoning_effort {
            body["reasoning_effort"] = serde_json::json!(effort.as_str());
        }

        if let Some(schema) = &self.schema {
            body["response_format"] = serde_json::json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "schema": schema.schema,
                },
            });
        }

        body
    }

    async fn post(&self, body: &serde_json::Value, stream: bool) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut request = self
            .client
            .post(&url)
            .headers(self.headers.clone())
            .bearer_auth(&self.api_key)
            .json(body);
        if stream {
            request = request.header("Accept", "text/event-stream");
        }

        let response = request.send().await.map_err(http::send_error)?;
        http::check_status(&self.name, response).await
    }

    async fn complete(&self, messages: &[Message]) -> Result<ModelResponse, ProviderError> {
        debug!(model = %self.name, "Sending completion request");
        let body = self.request_body(messages, false);
        let response = self.post(&body, false).await?;

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".into()))?;

        Ok(ModelResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: api_response.usage.map(Usage::from),
            model: api_response.model,
        })
    }

    async fn complete_streaming(
        &self,
        messages: &[Message],
        callbacks: &StreamCallbacks,
    ) -> Result<ModelResponse, ProviderError> {
        debug!(model = %self.name, "Sending streaming request");
        let body = self.request_body(messages, true);
        let response = self.post(&body, true).await?;

        callbacks.begin();

        let mut byte_stream = response.bytes_stream();
        let mut sse = SseBuffer::default();
        let mut content = String::new();
        let mut usage = None;
        let mut model = self.model.clone();

        let mut consume = |data: &str| {
            match serde_json::from_str::<StreamResponse>(data) {
                Ok(chunk) => {
                    if let Some(m) = chunk.model {
                        model = m;
                    }
                    if let Some(delta) = chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.delta.content)
                        .filter(|c| !c.is_empty())
                    {
                        callbacks.text(&delta);
                        content.push_str(&delta);
                    }
                    if let Some(u) = chunk.usage {
                        usage = Some(Usage::from(u));
                    }
                }
                Err(e) => {
                    trace!(model = %self.name, data = %data, error = %e, "Ignoring unparseable SSE chunk");
                }
            }
        };

        let mut done = false;
        'outer: while let Some(chunk) = byte_stream.next().await {
            let bytes = chunk.map_err(|e| ProviderError::StreamInterrupted(e.to_string()))?;

            for data in sse.push(&bytes) {
                if data == "[DONE]" {
                    done = true;
                    break 'outer;
                }
                consume(&data);
            }
        }
        let tail = if done { None } else { sse.finish() };
        if let Some(data) = tail.filter(|d| d != "[DONE]") {
            consume(&data);
        }

        Ok(ModelResponse { content, usage, model })
    }
}

#[async_trait]
impl ChatModel for OpenAiModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(&self, messages: &[Message]) -> Result<ModelResponse, ProviderError> {
        match &self.stream {
            Some(callbacks) => self.complete_streaming(messages, callbacks).await,
            None => self.complete(messages).await,
        }
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    model: String,
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<ApiUsage> for Usage {
    fn from(u: ApiUsage) -> Self {
        Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

/// A single SSE `data: {...}` chunk from a streaming response.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}
