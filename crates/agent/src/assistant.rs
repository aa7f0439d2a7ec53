//! The orchestration facade transports talk to.

use parley_core::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::factory::{AgentBuilder, EngineFactory};
use crate::session::{SessionRuntime, SessionState};

/// Sent to the user whenever a turn fails.
pub const APOLOGY: &str = "There was an error processing this request";

/// A ready-to-use assistant: model builder, session runtime, memory, tools
/// and skills wired together behind `send(message, author, location)`.
pub struct Assistant {
    runtime: SessionRuntime,
}

impl Assistant {
    pub fn new(factory: Arc<dyn EngineFactory>, idle_timeout: Duration) -> Self {
        Self {
            runtime: SessionRuntime::new(factory).with_idle_timeout(idle_timeout),
        }
    }

    /// Wire an assistant from the builder's configuration. The idle timeout
    /// is read once here; everything else is re-read on every rebuild.
    pub fn from_builder(builder: AgentBuilder) -> Result<Self> {
        let config = builder.load_config()?;
        Ok(Self::new(
            Arc::new(builder),
            Duration::from_secs(config.session.idle_timeout_secs),
        ))
    }

    /// Build the engine now instead of on the first message.
    pub async fn start(&self) -> Result<()> {
        self.runtime.start().await
    }

    /// One turn. An empty reply means the assistant chose not to answer.
    pub async fn send(&self, message: &str, author: &str, location: &str) -> Result<String> {
        self.runtime.send(message, author, location).await
    }

    /// One turn with transport semantics: failures become [`APOLOGY`] and
    /// silence becomes `None`.
    pub async fn respond(&self, message: &str, author: &str, location: &str) -> Option<String> {
        info!(from = %author, location = %location, "Message received");
        match self.send(message, author, location).await {
            Ok(reply) if reply.is_empty() => {
                info!("No reply");
                None
            }
            Ok(reply) => {
                info!(len = reply.len(), "Response generated");
                Some(reply)
            }
            Err(e) => {
                error!(error = %e, "Failed to call agent");
                Some(APOLOGY.to_string())
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.runtime.state()
    }

    pub fn runtime(&self) -> &SessionRuntime {
        &self.runtime
    }
}
