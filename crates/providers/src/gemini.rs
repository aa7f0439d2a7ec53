//! Google Gemini `generateContent` client.
//!
//! System messages are folded into `systemInstruction`; assistant turns use
//! the `model` role. Structured output goes through
//! `responseMimeType` + `responseJsonSchema`.

use async_trait::async_trait;
use futures::StreamExt;
use parley_core::error::ProviderError;
use parley_core::message::{Message, Role};
use parley_core::model::{ChatModel, ModelResponse, StreamCallbacks, Usage};
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::http::{self, SseBuffer};
use crate::schema::ResponseSchema;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A Gemini model.
pub struct GeminiModel {
    name: String,
    model: String,
    base_url: String,
    api_key: String,
    headers: HeaderMap,
    temperature: Option<f32>,
    schema: Option<ResponseSchema>,
    stream: Option<StreamCallbacks>,
    client: reqwest::Client,
}

impl GeminiModel {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, client: reqwest::Client) -> Self {
        let model = model.into();
        Self {
            name: format!("gemini/{model}"),
            model,
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            headers: HeaderMap::new(),
            temperature: None,
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

    pub fn with_schema(mut self, schema: ResponseSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_stream(mut self, callbacks: StreamCallbacks) -> Self {
        self.stream = Some(callbacks);
        self
    }

    fn request_body(&self, messages: &[Message]) -> GenerateRequest {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let contents = messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| Content {
                role: Some(match m.role {
                    Role::Assistant => "model".into(),
                    _ => "user".into(),
                }),
                parts: vec![Part {
                    text: Some(m.content.clone()),
                }],
            })
            .collect();

        let system_instruction = (!system.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part {
                text: Some(system.join("\n\n")),
            }],
        });

        let generation_config = (self.temperature.is_some() || self.schema.is_some()).then(|| {
            GenerationConfig {
                temperature: self.temperature,
                response_mime_type: self.schema.as_ref().map(|_| "application/json".into()),
                response_json_schema: self.schema.as_ref().map(|s| s.schema.clone()),
            }
        });

        GenerateRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    async fn post(&self, url: &str, body: &GenerateRequest) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(http::send_error)?;
        http::check_status(&self.name, response).await
    }

    async fn complete(&self, messages: &[Message]) -> Result<ModelResponse, ProviderError> {
        debug!(model = %self.name, "Sending generateContent request");
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self.post(&url, &self.request_body(messages)).await?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        if parsed.candidates.is_empty() {
            return Err(ProviderError::InvalidResponse("No candidates in response".into()));
        }

        Ok(ModelResponse {
            content: parsed.text(),
            usage: parsed.usage_metadata.map(Usage::from),
            model: parsed.model_version.unwrap_or_else(|| self.model.clone()),
        })
    }

    async fn complete_streaming(
        &self,
        messages: &[Message],
        callbacks: &StreamCallbacks,
    ) -> Result<ModelResponse, ProviderError> {
        debug!(model = %self.name, "Sending streamGenerateContent request");
        let url = format!("{}/models/{}:streamGenerateContent?alt=sse", self.base_url, self.model);
        let response = self.post(&url, &self.request_body(messages)).await?;

        callbacks.begin();

        let mut byte_stream = response.bytes_stream();
        let mut sse = SseBuffer::default();
        let mut content = String::new();
        let mut usage = None;
        let mut model = self.model.clone();

        let mut consume = |data: &str| match serde_json::from_str::<GenerateResponse>(data) {
            Ok(chunk) => {
                let text = chunk.text();
                if !text.is_empty() {
                    callbacks.text(&text);
                    content.push_str(&text);
                }
                if let Some(u) = chunk.usage_metadata {
                    usage = Some(Usage::from(u));
                }
                if let Some(v) = chunk.model_version {
                    model = v;
                }
            }
            Err(e) => {
                trace!(model = %self.name, data = %data, error = %e, "Ignoring unparseable SSE chunk");
            }
        };

        while let Some(chunk) = byte_stream.next().await {
            let bytes = chunk.map_err(|e| ProviderError::StreamInterrupted(e.to_string()))?;
            for data in sse.push(&bytes) {
                consume(&data);
            }
        }
        if let Some(data) = sse.finish() {
            consume(&data);
        }

        Ok(ModelResponse { content, usage, model })
    }
}

#[async_trait]
impl ChatModel for GeminiModel {
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

// --- Gemini API types (internal) ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_json_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl From<UsageMetadata> for Usage {
    fn from(u: UsageMetadata) -> Self {
        Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        }
    }
}
