//! ReasoningEngine trait: the think/act/observe loop the session drives.

use async_trait::async_trait;

use crate::error::Result;
use crate::notification::Notification;

/// One long-lived reasoning engine instance.
///
/// The session runtime owns exactly one instance at a time and never calls
/// it concurrently, so `send` takes `&mut self`.
#[async_trait]
pub trait ReasoningEngine: Send {
    /// Process one inbound message with its out-of-band notifications.
    ///
    /// An empty reply means the engine deliberately chose not to answer.
    async fn send(&mut self, message: &str, notifications: &[Notification]) -> Result<String>;
}
