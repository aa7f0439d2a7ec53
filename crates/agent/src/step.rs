//! Structured model outputs driving the reasoning loop.
//!
//! Both types are handed to the model builder, which derives a JSON schema
//! from them and attaches it as a provider-level response constraint.

use parley_core::tool::ToolArgs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One step of the agent model: think, then either act or reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AgentStep {
    /// Private reasoning about what to do next
    #[serde(default)]
    pub thought: String,

    /// Capabilities to call before replying. Empty when replying.
    #[serde(default)]
    pub actions: Vec<Action>,

    /// Final reply for this turn. An empty string means stay silent.
    #[serde(default)]
    pub reply: Option<String>,
}

impl AgentStep {
    /// A step finishes the turn when it requests no further actions.
    pub fn is_final(&self) -> bool {
        self.actions.is_empty()
    }
}

/// A single capability invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Action {
    /// Capability name
    pub tool: String,

    /// Argument bag passed to the capability
    #[serde(default)]
    pub args: ToolArgs,
}

/// The selector model's answer: which conditional skills apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkillSelection {
    #[serde(default)]
    pub keys: Vec<String>,
}

/// Parse model output into `T`, tolerating a Markdown code fence around it.
pub fn parse_structured<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim())
}
