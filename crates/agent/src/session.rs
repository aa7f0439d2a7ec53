//! Session runtime: owns the engine instance and its conversational context.
//!
//! All turn processing (idle check, rebuild, context update, engine call)
//! happens while holding one `tokio::sync::Mutex`, so at most one turn is in
//! flight and later turns queue behind it.

use parley_core::engine::ReasoningEngine;
use parley_core::error::{Error, Result};
use parley_core::notification::Notification;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::factory::EngineFactory;

/// Default gap between turns after which the session is rebuilt.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No engine has been built yet
    Uninitialized,
    /// An engine is ready for turns
    Active,
    /// An engine is being built to replace an idle one
    Resetting,
}

/// What the runtime remembers between turns of one engine instance.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub author: Option<String>,
    pub location: Option<String>,
    /// Set once the first turn after a (re)build has been delivered
    pub initialized: bool,
    pub last_activity: Option<Instant>,
}

impl SessionContext {
    /// Strictly more than `threshold` has passed since the last turn.
    pub fn is_idle(&self, now: Instant, threshold: Duration) -> bool {
        self.last_activity
            .is_some_and(|last| now.saturating_duration_since(last) > threshold)
    }

    /// Record a turn and return the notifications it should carry.
    ///
    /// The first turn after a (re)build only records who is talking and
    /// where, and carries a reminder. Later turns carry `switch_user` and
    /// `switch_location` when those change.
    pub fn observe(&mut self, author: &str, location: &str, now: Instant) -> Vec<Notification> {
        let mut notifications = Vec::new();
        self.last_activity = Some(now);

        if !self.initialized {
            self.initialized = true;
            self.author = Some(author.to_string());
            self.location = Some(location.to_string());
            notifications.push(Notification::reminder(author, location));
            return notifications;
        }

        if self.author.as_deref() != Some(author) {
            notifications.push(Notification::switch_user(author));
            self.author = Some(author.to_string());
        }
        if self.location.as_deref() != Some(location) {
            notifications.push(Notification::switch_location(location));
            self.location = Some(location.to_string());
        }
        notifications
    }
}

struct Inner {
    engine: Option<Box<dyn ReasoningEngine>>,
    context: SessionContext,
}

pub struct SessionRuntime {
    factory: Arc<dyn EngineFactory>,
    idle_timeout: Duration,
    inner: Mutex<Inner>,
    state: watch::Sender<SessionState>,
}

impl SessionRuntime {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            factory,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            inner: Mutex::new(Inner {
                engine: None,
                context: SessionContext::default(),
            }),
            state,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// A copy of the current context.
    pub async fn context(&self) -> SessionContext {
        self.inner.lock().await.context.clone()
    }

    /// Build the engine eagerly. Does nothing if one already exists.
    pub async fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.engine.is_none() {
            self.rebuild(&mut inner).await?;
        }
        Ok(())
    }

    /// Discard the current engine and context and build fresh ones.
    /// On failure the current engine stays in place.
    pub async fn reset(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        self.rebuild(&mut inner).await
    }

    /// Process one inbound message and return the engine's reply verbatim.
    /// An empty reply means the engine chose not to answer.
    pub async fn send(&self, message: &str, author: &str, location: &str) -> Result<String> {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();

        if inner.engine.is_none() {
            self.rebuild(&mut inner).await?;
        } else if inner.context.is_idle(now, self.idle_timeout) {
            info!(idle_timeout_secs = self.idle_timeout.as_secs(), "Session idle, rebuilding engine");
            if let Err(e) = self.rebuild(&mut inner).await {
                // Keep serving from the stale engine until the next idle period
                inner.context.last_activity = Some(now);
                return Err(Error::SessionReset(Box::new(e)));
            }
        }

        let notifications = inner.context.observe(author, location, now);
        debug!(
            author,
            location,
            notifications = ?notifications.iter().map(|n| n.kind.as_str()).collect::<Vec<_>>(),
            "Delivering turn"
        );

        let engine = inner
            .engine
            .as_mut()
            .ok_or_else(|| Error::Internal("session has no engine".into()))?;
        engine.send(message, &notifications).await
    }

    async fn rebuild(&self, inner: &mut Inner) -> Result<()> {
        let previous = self.state();
        if previous == SessionState::Active {
            self.state.send_replace(SessionState::Resetting);
        }

        match self.factory.build().await {
            Ok(engine) => {
                inner.engine = Some(engine);
                inner.context = SessionContext::default();
                self.state.send_replace(SessionState::Active);
                info!("Session engine ready");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to build session engine");
                self.state.send_replace(previous);
                Err(e)
            }
        }
    }
}
