//! Configuration loading, validation, and management for Parley.
//!
//! Loads configuration from `~/.parley/config.toml` with environment
//! variable overrides. Validates all settings at load time. The session
//! runtime re-reads configuration on every idle reset, so every value here is
//! treated as immutable for the lifetime of one engine instance.

pub mod skills;

use parley_core::skill::{Skill, SkillSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Persona used when neither `personality` nor `personality.txt` is present.
pub const DEFAULT_PERSONALITY: &str = "You are Parley, an AI assistant who talks like a person. \
You are witty but not to an annoying degree, and a little sarcastic. Keep replies short \
(one sentence for normal conversation) and write the way people write in chat.";

/// The root configuration structure.
///
/// Maps directly to `~/.parley/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding `scratchpad.txt`, `personality.txt` and `skills/`
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Inline personality; overrides `personality.txt`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,

    /// Per-call timeout for every provider HTTP client
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// OpenAI API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_key: Option<String>,

    /// Gemini API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_key: Option<String>,

    /// Session runtime settings
    #[serde(default)]
    pub session: SessionConfig,

    /// One model setup per role
    #[serde(default)]
    pub models: ModelsConfig,

    /// Skills declared inline (merged before skill files)
    #[serde(default)]
    pub skills: Vec<Skill>,

    /// Remote tool (MCP) endpoints
    #[serde(default)]
    pub tools: Vec<ToolConfig>,
}

fn default_data_dir() -> String {
    "~/.parley/data".into()
}
fn default_request_timeout() -> u64 {
    120
}
fn default_idle_timeout() -> u64 {
    3600
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

/// Header values routinely carry bearer tokens; only the names are shown.
fn redact_headers(headers: &HashMap<String, String>) -> Vec<&str> {
    let mut names: Vec<&str> = headers.keys().map(|k| k.as_str()).collect();
    names.sort_unstable();
    names
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("data_dir", &self.data_dir)
            .field("personality", &self.personality.as_ref().map(|p| p.len()))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("openai_key", &redact(&self.openai_key))
            .field("gemini_key", &redact(&self.gemini_key))
            .field("session", &self.session)
            .field("models", &self.models)
            .field("skills", &self.skills.len())
            .field("tools", &self.tools)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum gap between turns before the session is rebuilt
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Produces the agent's reasoning steps and replies
    #[serde(default = "default_agent_model")]
    pub agent: ModelSetup,

    /// Picks which conditional skills apply to a message
    #[serde(default = "default_selector_model")]
    pub selector: ModelSetup,
}

fn default_agent_model() -> ModelSetup {
    ModelSetup::openai("gpt-4.1")
}
fn default_selector_model() -> ModelSetup {
    ModelSetup::openai("gpt-4.1-mini")
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            agent: default_agent_model(),
            selector: default_selector_model(),
        }
    }
}

/// Configuration for one model role.
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelSetup {
    /// "openai" or "gemini"
    pub provider: String,

    /// Model name as the provider knows it
    pub name: String,

    /// Endpoint base URL
    pub url: String,

    /// Additional attempts after a failed call
    #[serde(default)]
    pub retries: u32,

    /// Fixed delay between attempts
    #[serde(default)]
    pub retry_delay_ms: u64,

    /// Extra HTTP headers sent with every request
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// "low", "medium" or "high" (OpenAI only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
}

impl ModelSetup {
    pub fn openai(name: impl Into<String>) -> Self {
        Self {
            provider: "openai".into(),
            name: name.into(),
            url: "https://api.openai.com/v1".into(),
            retries: 2,
            retry_delay_ms: 500,
            headers: HashMap::new(),
            temperature: None,
            reasoning_effort: None,
        }
    }

    pub fn gemini(name: impl Into<String>) -> Self {
        Self {
            provider: "gemini".into(),
            name: name.into(),
            url: "https://generativelanguage.googleapis.com/v1beta".into(),
            retries: 2,
            retry_delay_ms: 500,
            headers: HashMap::new(),
            temperature: None,
            reasoning_effort: None,
        }
    }
}

impl std::fmt::Debug for ModelSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSetup")
            .field("provider", &self.provider)
            .field("name", &self.name)
            .field("url", &self.url)
            .field("retries", &self.retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("headers", &redact_headers(&self.headers))
            .field("temperature", &self.temperature)
            .field("reasoning_effort", &self.reasoning_effort)
            .finish()
    }
}

/// One remote tool source.
#[derive(Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Streamable-HTTP MCP endpoint
    pub url: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    /// Disabled endpoints are never contacted
    #[serde(default)]
    pub enabled: bool,
}

impl std::fmt::Debug for ToolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolConfig")
            .field("url", &self.url)
            .field("headers", &redact_headers(&self.headers))
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.parley/config.toml).
    ///
    /// Also checks environment variables:
    /// - `OPENAI_KEY` / `OPENAI_API_KEY`
    /// - `GEMINI_KEY` / `GEMINI_API_KEY`
    /// - `PARLEY_DATA_DIR`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path` and apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;

        if config.openai_key.is_none() {
            config.openai_key = std::env::var("OPENAI_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if config.gemini_key.is_none() {
            config.gemini_key = std::env::var("GEMINI_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        }

        if let Ok(dir) = std::env::var("PARLEY_DATA_DIR") {
            config.data_dir = dir;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".parley")
    }

    /// The data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    pub fn scratchpad_path(&self) -> PathBuf {
        self.data_path().join("scratchpad.txt")
    }

    pub fn skills_dir(&self) -> PathBuf {
        self.data_path().join("skills")
    }

    /// The personality text: inline override, then `personality.txt`, then
    /// the built-in default.
    pub fn personality(&self) -> Result<String, ConfigError> {
        if let Some(p) = &self.personality {
            return Ok(p.clone());
        }
        let path = self.data_path().join("personality.txt");
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DEFAULT_PERSONALITY.into()),
            Err(e) => Err(ConfigError::ReadError {
                path,
                reason: e.to_string(),
            }),
        }
    }

    /// All skills: inline ones first, then `<data_dir>/skills/**/*.mdc`.
    /// Duplicate keys resolve last-wins.
    pub fn skill_set(&self) -> Result<SkillSet, ConfigError> {
        let mut set: SkillSet = self.skills.iter().cloned().collect();
        set.extend(skills::load_skill_dir(&self.skills_dir())?);
        Ok(set)
    }

    /// All tool endpoints: `[[tools]]` entries first, then one JSON file per
    /// endpoint under `<data_dir>/mcp/`, in file-name order.
    pub fn tool_configs(&self) -> Result<Vec<ToolConfig>, ConfigError> {
        let mut tools = self.tools.clone();
        let dir = self.data_path().join("mcp");
        if !dir.exists() {
            return Ok(tools);
        }

        let read_err = |path: &Path, e: std::io::Error| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| read_err(&dir, e))? {
            let path = entry.map_err(|e| read_err(&dir, e))?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let raw = std::fs::read_to_string(&path).map_err(|e| read_err(&path, e))?;
            let tool: ToolConfig =
                serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            tools.push(tool);
        }
        Ok(tools)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        for (role, setup) in [("agent", &self.models.agent), ("selector", &self.models.selector)] {
            if let Some(t) = setup.temperature {
                if !(0.0..=2.0).contains(&t) {
                    return Err(ConfigError::ValidationError(format!(
                        "models.{role}.temperature must be between 0.0 and 2.0"
                    )));
                }
            }
            if setup.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "models.{role}.name must not be empty"
                )));
            }
        }

        if self.session.idle_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "session.idle_timeout_secs must be > 0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            personality: None,
            request_timeout_secs: default_request_timeout(),
            openai_key: None,
            gemini_key: None,
            session: SessionConfig::default(),
            models: ModelsConfig::default(),
            skills: vec![],
            tools: vec![],
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs_home().join(rest),
        None if path == "~" => dirs_home(),
        None => PathBuf::from(path),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to load skill {path}: {reason}")]
    SkillError { path: PathBuf, reason: String },
}

impl From<ConfigError> for parley_core::Error {
    fn from(e: ConfigError) -> Self {
        parley_core::Error::Config {
            message: e.to_string(),
        }
    }
}
