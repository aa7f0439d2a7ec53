//! Model Context Protocol support: a streamable-HTTP client built on `rmcp`
//! and the bridge that turns remote tools into capabilities.

pub mod bridge;
pub mod client;

#[cfg(test)]
mod test_server;

pub use bridge::{McpCapability, discover, discover_all};
pub use client::{McpClient, McpError};
