//! Capability trait: the abstraction over everything the engine can invoke.
//!
//! Local tools (clock, scratch pad) and bridged remote tools implement the
//! same three operations, so the reasoning engine never distinguishes where a
//! capability came from.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ToolError;

/// The key→value argument bag passed to a capability.
pub type ToolArgs = serde_json::Map<String, serde_json::Value>;

/// The core Capability trait.
#[async_trait]
pub trait Capability: Send + Sync {
    /// The unique name of this capability (e.g., "get_time").
    fn name(&self) -> &str;

    /// Multi-line usage description shown to the model: first line is the
    /// summary, following lines describe the arguments.
    fn description(&self) -> Vec<String>;

    /// Invoke the capability.
    async fn call(&self, args: ToolArgs) -> std::result::Result<String, ToolError>;
}

/// Fetch a required string argument from an argument bag.
pub fn string_arg<'a>(args: &'a ToolArgs, key: &str) -> std::result::Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidArguments(format!("missing or invalid '{key}'")))
}

/// The flat, insertion-ordered set of capabilities handed to one engine
/// instance.
#[derive(Clone, Default)]
pub struct CapabilitySet {
    capabilities: Vec<Arc<dyn Capability>>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability. Names are unique: a second capability with a
    /// name already in the set is rejected and the set is left unchanged.
    pub fn register(&mut self, capability: Arc<dyn Capability>) -> std::result::Result<(), ToolError> {
        if self.get(capability.name()).is_some() {
            return Err(ToolError::DuplicateName(capability.name().to_string()));
        }
        self.capabilities.push(capability);
        Ok(())
    }

    /// Register every capability from an iterator, stopping at the first
    /// duplicate name.
    pub fn extend(
        &mut self,
        capabilities: impl IntoIterator<Item = Arc<dyn Capability>>,
    ) -> std::result::Result<(), ToolError> {
        for capability in capabilities {
            self.register(capability)?;
        }
        Ok(())
    }

    /// Get a capability by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Capability>> {
        self.capabilities.iter().find(|c| c.name() == name)
    }

    /// Invoke a capability by name.
    pub async fn call(&self, name: &str, args: ToolArgs) -> std::result::Result<String, ToolError> {
        let capability = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        capability.call(args).await
    }

    /// All capabilities in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Capability>> {
        self.capabilities.iter()
    }

    /// List all registered names.
    pub fn names(&self) -> Vec<&str> {
        self.capabilities.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}
