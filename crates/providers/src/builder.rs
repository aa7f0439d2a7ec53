//! Model builder: turns a role's `ModelSetup` into a callable model.
//!
//! Every model comes out of the same pipeline:
//!
//! ```text
//! raw client (openai | gemini) -> LoggingModel -> RetryModel (retries > 0)
//! ```

use parley_config::{AppConfig, ModelSetup};
use parley_core::error::ModelBuildError;
use parley_core::model::{ChatModel, ModelPurpose, StreamCallbacks};
use schemars::JsonSchema;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::gemini::GeminiModel;
use crate::http;
use crate::logging::LoggingModel;
use crate::openai::{OpenAiModel, ReasoningEffort};
use crate::retry::RetryModel;
use crate::schema::ResponseSchema;

/// The providers the builder can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl std::str::FromStr for ProviderKind {
    type Err = ModelBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(ModelBuildError::UnknownProvider(other.to_string())),
        }
    }
}

/// Builds agent and selector models from role-scoped configuration.
#[derive(Clone)]
pub struct ModelBuilder {
    agent: ModelSetup,
    selector: ModelSetup,
    openai_key: String,
    gemini_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for ModelBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("agent", &self.agent)
            .field("selector", &self.selector)
            .field("openai_key", &(!self.openai_key.is_empty()).then_some("[REDACTED]"))
            .field("gemini_key", &(!self.gemini_key.is_empty()).then_some("[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ModelBuilder {
    pub fn new(agent: ModelSetup, selector: ModelSetup) -> Self {
        Self {
            agent,
            selector,
            openai_key: String::new(),
            gemini_key: String::new(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.models.agent.clone(), config.models.selector.clone())
            .with_openai_key(config.openai_key.clone().unwrap_or_default())
            .with_gemini_key(config.gemini_key.clone().unwrap_or_default())
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
    }

    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_key = key.into();
        self
    }

    pub fn with_gemini_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_key = key.into();
        self
    }

    /// Per-call HTTP timeout for every client this builder creates.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The model that drives the reasoning loop, constrained to `T`'s shape
    /// and optionally streaming.
    pub fn build_agent_model<T: JsonSchema>(
        &self,
        callbacks: Option<StreamCallbacks>,
    ) -> Result<Arc<dyn ChatModel>, ModelBuildError> {
        let schema = ResponseSchema::of::<T>()?;
        self.build(&self.agent, ModelPurpose::Response, Some(schema), callbacks)
    }

    /// The model that picks applicable skills, constrained to `T`'s shape.
    pub fn build_selector_model<T: JsonSchema>(&self) -> Result<Arc<dyn ChatModel>, ModelBuildError> {
        let schema = ResponseSchema::of::<T>()?;
        self.build(&self.selector, ModelPurpose::Selection, Some(schema), None)
    }

    /// Build one model. Selection models never stream.
    pub fn build(
        &self,
        setup: &ModelSetup,
        purpose: ModelPurpose,
        schema: Option<ResponseSchema>,
        callbacks: Option<StreamCallbacks>,
    ) -> Result<Arc<dyn ChatModel>, ModelBuildError> {
        let kind: ProviderKind = setup.provider.parse()?;
        let effort = setup
            .reasoning_effort
            .as_deref()
            .map(str::parse::<ReasoningEffort>)
            .transpose()?;

        let callbacks = match purpose {
            ModelPurpose::Response => callbacks,
            ModelPurpose::Selection => None,
        };

        let client = http::build_client(self.timeout)?;
        let headers = http::header_map(&setup.headers)?;

        let raw: Arc<dyn ChatModel> = match kind {
            ProviderKind::OpenAi => {
                let mut model = OpenAiModel::new(&setup.name, &self.openai_key, client)
                    .with_base_url(&setup.url)
                    .with_headers(headers);
                if let Some(t) = setup.temperature {
                    model = model.with_temperature(t);
                }
                if let Some(effort) = effort {
                    model = model.with_reasoning_effort(effort);
                }
                if let Some(schema) = schema {
                    model = model.with_schema(schema);
                }
                if let Some(cb) = callbacks {
                    model = model.with_stream(cb);
                }
                Arc::new(model)
            }
            ProviderKind::Gemini => {
                if effort.is_some() {
                    debug!(model = %setup.name, "reasoning_effort is not supported by gemini, ignoring");
                }
                let mut model = GeminiModel::new(&setup.name, &self.gemini_key, client)
                    .with_base_url(&setup.url)
                    .with_headers(headers);
                if let Some(t) = setup.temperature {
                    model = model.with_temperature(t);
                }
                if let Some(schema) = schema {
                    model = model.with_schema(schema);
                }
                if let Some(cb) = callbacks {
                    model = model.with_stream(cb);
                }
                Arc::new(model)
            }
        };

        let mut model: Arc<dyn ChatModel> = Arc::new(LoggingModel::new(raw));
        if setup.retries > 0 {
            model = Arc::new(
                RetryModel::new(model, setup.retries)
                    .with_delay(Duration::from_millis(setup.retry_delay_ms)),
            );
        }

        debug!(
            provider = %setup.provider,
            model = %setup.name,
            ?purpose,
            retries = setup.retries,
            "Built model"
        );
        Ok(model)
    }
}
