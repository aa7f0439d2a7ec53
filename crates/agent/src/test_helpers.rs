//! Shared test helpers: scripted models, recording engines and factories.

use async_trait::async_trait;
use parley_core::engine::ReasoningEngine;
use parley_core::error::{Error, ProviderError, Result};
use parley_core::message::Message;
use parley_core::model::{ChatModel, ModelResponse, Usage};
use parley_core::notification::{Notification, NotificationKind};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::factory::EngineFactory;

/// A mock model that returns a sequence of scripted responses.
///
/// Each call to `respond` returns the next response in the queue.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockModel {
    responses: Vec<std::result::Result<String, ProviderError>>,
    repeat_last: bool,
    call_count: Mutex<usize>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl SequentialMockModel {
    pub fn new(responses: Vec<impl Into<String>>) -> Self {
        Self {
            responses: responses.into_iter().map(|r| Ok(r.into())).collect(),
            repeat_last: false,
            call_count: Mutex::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A model whose every call fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            responses: vec![Err(error)],
            repeat_last: true,
            call_count: Mutex::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A model that answers every call with the same response.
    pub fn always(response: impl Into<String>) -> Self {
        Self {
            responses: vec![Ok(response.into())],
            repeat_last: true,
            call_count: Mutex::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// The message lists passed to each call, in order.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for SequentialMockModel {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn respond(&self, messages: &[Message]) -> std::result::Result<ModelResponse, ProviderError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let mut count = self.call_count.lock().unwrap();

        let index = if self.repeat_last {
            (*count).min(self.responses.len() - 1)
        } else {
            *count
        };
        if index >= self.responses.len() {
            panic!(
                "SequentialMockModel: no more responses (call #{}, have {})",
                *count,
                self.responses.len()
            );
        }
        *count += 1;

        self.responses[index].clone().map(|content| ModelResponse {
            content,
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// An `AgentStep` that finishes the turn with `reply`.
pub fn reply_step(reply: &str) -> String {
    json!({"thought": "ready to answer", "actions": [], "reply": reply}).to_string()
}

/// An `AgentStep` requesting a single capability call.
pub fn action_step(tool: &str, args: serde_json::Value) -> String {
    json!({"thought": format!("calling {tool}"), "actions": [{"tool": tool, "args": args}], "reply": null})
        .to_string()
}

/// One turn as seen by a [`RecordingEngine`].
#[derive(Debug, Clone)]
pub struct RecordedTurn {
    /// Which build produced the engine that served this turn (1-based)
    pub engine: usize,
    pub message: String,
    pub notifications: Vec<Notification>,
}

impl RecordedTurn {
    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.notifications.iter().map(|n| n.kind).collect()
    }
}

/// Engine that records every turn and echoes the message back.
pub struct RecordingEngine {
    id: usize,
    turns: Arc<Mutex<Vec<RecordedTurn>>>,
    delay: Duration,
}

#[async_trait]
impl ReasoningEngine for RecordingEngine {
    async fn send(&mut self, message: &str, notifications: &[Notification]) -> Result<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.turns.lock().unwrap().push(RecordedTurn {
            engine: self.id,
            message: message.to_string(),
            notifications: notifications.to_vec(),
        });
        match message {
            "fail" => Err(Error::Engine("scripted failure".into())),
            "silence" => Ok(String::new()),
            _ => Ok(format!("echo: {message}")),
        }
    }
}

/// Factory producing [`RecordingEngine`]s that share one turn log.
#[derive(Default)]
pub struct RecordingFactory {
    builds: AtomicUsize,
    fail_builds: AtomicBool,
    turns: Arc<Mutex<Vec<RecordedTurn>>>,
    delay: Duration,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engines sleep this long inside every turn.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_builds.store(failing, Ordering::SeqCst);
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    pub fn turns(&self) -> Vec<RecordedTurn> {
        self.turns.lock().unwrap().clone()
    }
}

#[async_trait]
impl EngineFactory for RecordingFactory {
    async fn build(&self) -> Result<Box<dyn ReasoningEngine>> {
        if self.fail_builds.load(Ordering::SeqCst) {
            return Err(Error::Config {
                message: "scripted build failure".into(),
            });
        }
        let id = self.builds.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Box::new(RecordingEngine {
            id,
            turns: self.turns.clone(),
            delay: self.delay,
        }))
    }
}

/// A bare MCP endpoint that answers the handshake and lists fixed tools.
pub struct McpStub {
    addr: std::net::SocketAddr,
}

impl McpStub {
    pub async fn serving(tools: serde_json::Value) -> Self {
        use axum::Json;
        use axum::http::StatusCode;
        use axum::response::IntoResponse;
        use axum::routing::post;

        let handler = move |Json(req): Json<serde_json::Value>| {
            let tools = tools.clone();
            async move {
                let id = req["id"].clone();
                let result = match req["method"].as_str().unwrap_or_default() {
                    "initialize" => json!({
                        "protocolVersion": req["params"]["protocolVersion"],
                        "capabilities": {"tools": {}},
                        "serverInfo": {"name": "stub", "version": "0.0.1"}
                    }),
                    "tools/list" => json!({"tools": tools}),
                    _ => return StatusCode::ACCEPTED.into_response(),
                };
                (
                    [("mcp-session-id", "stub-session")],
                    Json(json!({"jsonrpc": "2.0", "id": id, "result": result})),
                )
                    .into_response()
            }
        };

        let app = axum::Router::new().route(
            "/mcp",
            post(handler)
                .get(|| async { StatusCode::METHOD_NOT_ALLOWED })
                .delete(|| async { StatusCode::ACCEPTED }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr }
    }

    pub fn url(&self) -> String {
        format!("http://{}/mcp", self.addr)
    }
}
