//! Retry decorator: re-issues failed calls against the same model.
//!
//! Only transient failures are retried (network, timeouts, rate limits,
//! 5xx, malformed output). Authentication failures and other 4xx responses
//! fail immediately since repeating them cannot succeed.

use async_trait::async_trait;
use parley_core::error::ProviderError;
use parley_core::message::Message;
use parley_core::model::{ChatModel, ModelResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Wraps a model and retries failed calls up to `retries` extra times.
pub struct RetryModel {
    inner: Arc<dyn ChatModel>,
    retries: u32,
    delay: Duration,
}

impl RetryModel {
    pub fn new(inner: Arc<dyn ChatModel>, retries: u32) -> Self {
        Self {
            inner,
            retries,
            delay: Duration::ZERO,
        }
    }

    /// Fixed pause between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }
}

/// Whether another attempt could plausibly succeed.
pub fn is_transient(error: &ProviderError) -> bool {
    match error {
        ProviderError::AuthenticationFailed(_) => false,
        ProviderError::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 408,
        _ => true,
    }
}

#[async_trait]
impl ChatModel for RetryModel {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn respond(&self, messages: &[Message]) -> Result<ModelResponse, ProviderError> {
        let attempts = self.retries.saturating_add(1);
        let mut attempt = 1;

        loop {
            match self.inner.respond(messages).await {
                Ok(response) => {
                    if attempt > 1 {
                        debug!(model = %self.inner.name(), attempt, "Retry succeeded");
                    }
                    return Ok(response);
                }
                Err(e) if attempt < attempts && is_transient(&e) => {
                    warn!(
                        model = %self.inner.name(),
                        attempt,
                        total = attempts,
                        error = %e,
                        "Model call failed, retrying"
                    );
                    if !self.delay.is_zero() {
                        tokio::time::sleep(self.delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
