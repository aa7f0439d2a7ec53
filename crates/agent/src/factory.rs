//! Engine construction.
//!
//! The session runtime asks an [`EngineFactory`] for a fresh engine on start
//! and on every idle reset. [`AgentBuilder`] is the production factory: it
//! re-reads configuration, builds both models, opens the scratch pad,
//! discovers remote tools and loads skills and personality each time.

use async_trait::async_trait;
use parley_config::{AppConfig, ConfigError};
use parley_core::engine::ReasoningEngine;
use parley_core::error::Result;
use parley_core::memory::ScratchPad;
use parley_core::model::StreamCallbacks;
use parley_core::tool::CapabilitySet;
use parley_memory::FileScratchPad;
use parley_providers::ModelBuilder;
use parley_tools::{local_capabilities, mcp};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::react::{DEFAULT_MAX_ITERATIONS, ReactEngine};
use crate::step::{AgentStep, SkillSelection};

/// Produces ready-to-use engine instances.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn build(&self) -> Result<Box<dyn ReasoningEngine>>;
}

/// Builds [`ReactEngine`]s from the configuration on disk.
#[derive(Debug, Clone)]
pub struct AgentBuilder {
    config_path: Option<PathBuf>,
    callbacks: Option<StreamCallbacks>,
    max_iterations: usize,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    /// A builder reading `~/.parley/config.toml`.
    pub fn new() -> Self {
        Self {
            config_path: None,
            callbacks: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Stream the agent model's output through these callbacks.
    pub fn with_stream(mut self, callbacks: StreamCallbacks) -> Self {
        self.callbacks = Some(callbacks);
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Read the configuration this builder would use right now.
    pub fn load_config(&self) -> std::result::Result<AppConfig, ConfigError> {
        match &self.config_path {
            Some(path) => AppConfig::load_with_env(path),
            None => AppConfig::load(),
        }
    }

    /// Build a fully wired engine from the current configuration.
    pub async fn build_engine(&self) -> Result<ReactEngine> {
        let config = self.load_config()?;

        // Models first: a bad provider or effort tier must fail before any
        // endpoint is contacted.
        let models = ModelBuilder::from_config(&config);
        let agent_model = models.build_agent_model::<AgentStep>(self.callbacks.clone())?;
        let selector_model = models.build_selector_model::<SkillSelection>()?;

        let pad: Arc<dyn ScratchPad> = Arc::new(FileScratchPad::new(config.scratchpad_path()));
        let capabilities = assemble_capabilities(&config, pad).await?;
        let skills = config.skill_set()?;
        let personality = config.personality()?;

        info!(
            agent = %agent_model.name(),
            selector = %selector_model.name(),
            capabilities = capabilities.len(),
            skills = skills.len(),
            "Engine built"
        );

        Ok(ReactEngine::new(agent_model, capabilities)
            .with_selector(selector_model)
            .with_skills(skills)
            .with_personality(personality)
            .with_max_iterations(self.max_iterations))
    }
}

#[async_trait]
impl EngineFactory for AgentBuilder {
    async fn build(&self) -> Result<Box<dyn ReasoningEngine>> {
        Ok(Box::new(self.build_engine().await?))
    }
}

/// Local capabilities followed by every reachable, enabled remote tool.
/// A remote tool reusing a name already taken fails the build.
pub async fn assemble_capabilities(config: &AppConfig, pad: Arc<dyn ScratchPad>) -> Result<CapabilitySet> {
    let mut capabilities = local_capabilities(pad)?;
    let remote = mcp::discover_all(
        &config.tool_configs()?,
        Duration::from_secs(config.request_timeout_secs),
    )
    .await;
    capabilities.extend(remote)?;
    Ok(capabilities)
}
