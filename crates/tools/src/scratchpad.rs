//! Scratch pad capabilities: read and exact-match rewrite.

use async_trait::async_trait;
use parley_core::error::ToolError;
use parley_core::memory::ScratchPad;
use parley_core::tool::{Capability, ToolArgs, string_arg};
use std::sync::Arc;
use tracing::debug;

pub struct ReadScratchPadTool {
    pad: Arc<dyn ScratchPad>,
}

impl ReadScratchPadTool {
    pub fn new(pad: Arc<dyn ScratchPad>) -> Self {
        Self { pad }
    }
}

#[async_trait]
impl Capability for ReadScratchPadTool {
    fn name(&self) -> &str {
        "read_scratchpad"
    }

    fn description(&self) -> Vec<String> {
        vec!["Reads the entire scratchpad".into(), "Takes no arguments".into()]
    }

    async fn call(&self, _args: ToolArgs) -> Result<String, ToolError> {
        Ok(self.pad.content().await?)
    }
}

pub struct RewriteScratchPadTool {
    pad: Arc<dyn ScratchPad>,
}

impl RewriteScratchPadTool {
    pub fn new(pad: Arc<dyn ScratchPad>) -> Self {
        Self { pad }
    }
}

#[async_trait]
impl Capability for RewriteScratchPadTool {
    fn name(&self) -> &str {
        "rewrite_scratchpad"
    }

    fn description(&self) -> Vec<String> {
        vec![
            "Rewrites part of the scratchpad".into(),
            "Arguments:".into(),
            "- old_text: text to replace, must appear exactly once (may be empty if scratchpad is empty)".into(),
            "- new_text: replacement text".into(),
        ]
    }

    async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
        let old_text = string_arg(&args, "old_text")?;
        let new_text = string_arg(&args, "new_text")?;

        self.pad.rewrite(old_text, new_text).await?;
        debug!(old_len = old_text.len(), new_len = new_text.len(), "Scratchpad rewrite applied");
        Ok("scratchpad updated".into())
    }
}

/// Both scratch pad capabilities over one pad.
pub fn scratchpad_capabilities(pad: Arc<dyn ScratchPad>) -> Vec<Arc<dyn Capability>> {
    vec![
        Arc::new(ReadScratchPadTool::new(pad.clone())),
        Arc::new(RewriteScratchPadTool::new(pad)),
    ]
}
