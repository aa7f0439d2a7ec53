//! Capabilities for Parley.
//!
//! Local capabilities give the agent a clock and its private scratch pad;
//! the MCP bridge adds whatever remote tool servers are configured. All of
//! them implement `parley_core::Capability`.

pub mod clock;
pub mod mcp;
pub mod scratchpad;

use parley_core::error::ToolError;
use parley_core::memory::ScratchPad;
use parley_core::tool::CapabilitySet;
use std::sync::Arc;

pub use clock::ClockTool;
pub use scratchpad::{ReadScratchPadTool, RewriteScratchPadTool, scratchpad_capabilities};

/// The capabilities every engine gets regardless of configuration.
pub fn local_capabilities(pad: Arc<dyn ScratchPad>) -> Result<CapabilitySet, ToolError> {
    let mut set = CapabilitySet::new();
    set.register(Arc::new(ClockTool))?;
    set.extend(scratchpad_capabilities(pad))?;
    Ok(set)
}
