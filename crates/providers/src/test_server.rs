//! In-process HTTP server standing in for provider endpoints in tests.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// A canned reply. Requests past the end of the script repeat the last one.
#[derive(Debug, Clone)]
pub enum Canned {
    Json(Value),
    EventStream(String),
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct Recorded {
    /// Path plus query string
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers.get(name).cloned()
    }
}

struct Shared {
    script: Vec<Canned>,
    requests: Mutex<Vec<Recorded>>,
}

pub struct MockServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

impl MockServer {
    pub async fn start(script: Vec<Canned>) -> Self {
        assert!(!script.is_empty(), "mock server needs at least one reply");
        let shared = Arc::new(Shared {
            script,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, shared }
    }

    pub async fn json(body: Value) -> Self {
        Self::start(vec![Canned::Json(body)]).await
    }

    pub async fn event_stream(body: String) -> Self {
        Self::start(vec![Canned::EventStream(body)]).await
    }

    pub async fn status(code: u16) -> Self {
        Self::start(vec![Canned::Status(code)]).await
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request reached the mock server")
    }
}

/// Frame payloads as `text/event-stream`.
pub fn sse_body(payloads: &[&str]) -> String {
    payloads.iter().map(|p| format!("data: {p}\n\n")).collect()
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let canned = {
        let mut requests = shared.requests.lock().unwrap();
        let index = requests.len().min(shared.script.len() - 1);
        requests.push(Recorded {
            path: uri
                .path_and_query()
                .map(|p| p.to_string())
                .unwrap_or_default(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect(),
            body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        });
        shared.script[index].clone()
    };

    match canned {
        Canned::Json(value) => Json(value).into_response(),
        Canned::EventStream(text) => ([(header::CONTENT_TYPE, "text/event-stream")], text).into_response(),
        Canned::Status(code) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "mock failure",
        )
            .into_response(),
    }
}
