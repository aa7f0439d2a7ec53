pub mod chat;
pub mod doctor;
pub mod scratchpad;
pub mod tools;

use parley_agent::AgentBuilder;
use parley_config::AppConfig;
use std::path::PathBuf;

/// The engine builder for an optional `--config` override.
pub fn agent_builder(config: Option<PathBuf>) -> AgentBuilder {
    match config {
        Some(path) => AgentBuilder::new().with_config_path(path),
        None => AgentBuilder::new(),
    }
}

pub fn load_config(config: Option<PathBuf>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    agent_builder(config)
        .load_config()
        .map_err(|e| format!("Failed to load config: {e}").into())
}
