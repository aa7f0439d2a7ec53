//! In-process MCP server for bridge tests.

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct LoggedRequest {
    pub method: String,
    pub session: Option<String>,
    pub authorization: Option<String>,
    pub client_name: Option<String>,
}

struct Shared {
    /// `None` means the default two-page catalogue
    tools: Option<Vec<Value>>,
    log: Mutex<Vec<LoggedRequest>>,
}

pub struct FakeMcpServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

impl FakeMcpServer {
    pub async fn start() -> Self {
        Self::spawn(None).await
    }

    /// Serve a single page with exactly these tool definitions.
    pub async fn with_tools(tools: Vec<Value>) -> Self {
        Self::spawn(Some(tools)).await
    }

    async fn spawn(tools: Option<Vec<Value>>) -> Self {
        let shared = Arc::new(Shared {
            tools,
            log: Mutex::new(Vec::new()),
        });
        // No server-initiated stream; sessions end with a DELETE.
        let app = Router::new()
            .route(
                "/mcp",
                post(handle)
                    .get(|| async { StatusCode::METHOD_NOT_ALLOWED })
                    .delete(|| async { StatusCode::ACCEPTED }),
            )
            .with_state(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, shared }
    }

    pub fn url(&self) -> String {
        format!("http://{}/mcp", self.addr)
    }

    pub fn log(&self) -> Vec<LoggedRequest> {
        self.shared.log.lock().unwrap().clone()
    }
}

fn text_param_schema() -> Value {
    json!({
        "type": "object",
        "properties": {"text": {"type": "string", "description": "Text to echo"}},
        "required": ["text"]
    })
}

fn page_one() -> Vec<Value> {
    vec![
        json!({"name": "echo", "description": "Echo text back", "inputSchema": text_param_schema()}),
        json!({"name": "silent", "description": "Returns only an image", "inputSchema": {"type": "object"}}),
    ]
}

fn page_two() -> Vec<Value> {
    vec![
        json!({"name": "broken", "description": "Always fails", "inputSchema": {"type": "object"}}),
        json!({"name": "sse_echo", "description": "Echo over SSE", "inputSchema": text_param_schema()}),
    ]
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(String::from)
}

fn rpc_result(id: &Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

async fn handle(State(shared): State<Arc<Shared>>, headers: HeaderMap, Json(req): Json<Value>) -> Response {
    let method = req["method"].as_str().unwrap_or_default().to_string();
    let id = req["id"].clone();
    let params = req["params"].clone();

    shared.log.lock().unwrap().push(LoggedRequest {
        method: method.clone(),
        session: header_value(&headers, "mcp-session-id"),
        authorization: header_value(&headers, "authorization"),
        client_name: params["clientInfo"]["name"].as_str().map(String::from),
    });

    match method.as_str() {
        "initialize" => (
            [("mcp-session-id", "sess-1")],
            Json(rpc_result(
                &id,
                json!({
                    "protocolVersion": params["protocolVersion"],
                    "capabilities": {"tools": {}},
                    "serverInfo": {"name": "fake", "version": "0.0.1"}
                }),
            )),
        )
            .into_response(),

        "notifications/initialized" => StatusCode::ACCEPTED.into_response(),

        "tools/list" => {
            let result = match (&shared.tools, params["cursor"].as_str()) {
                (Some(tools), _) => json!({"tools": tools}),
                (None, None) => json!({"tools": page_one(), "nextCursor": "page-2"}),
                (None, Some(_)) => json!({"tools": page_two()}),
            };
            Json(rpc_result(&id, result)).into_response()
        }

        "tools/call" => {
            let name = params["name"].as_str().unwrap_or_default();
            let text = params["arguments"]["text"].as_str().unwrap_or_default();
            match name {
                "echo" => Json(rpc_result(
                    &id,
                    json!({"content": [
                        {"type": "text", "text": text},
                        {"type": "image", "data": "", "mimeType": "image/png"},
                        {"type": "text", "text": format!("{text} again")}
                    ]}),
                ))
                .into_response(),
                "silent" => Json(rpc_result(
                    &id,
                    json!({"content": [{"type": "image", "data": "", "mimeType": "image/png"}]}),
                ))
                .into_response(),
                "broken" => Json(rpc_result(
                    &id,
                    json!({"content": [{"type": "text", "text": "disk on fire"}], "isError": true}),
                ))
                .into_response(),
                "sse_echo" => {
                    let message = rpc_result(&id, json!({"content": [{"type": "text", "text": text}]}));
                    let body = format!("event: message\ndata: {message}\n\n");
                    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
                }
                _ => Json(json!({
                    "jsonrpc": "2.0", "id": id,
                    "error": {"code": -32602, "message": format!("unknown tool {name}")}
                }))
                .into_response(),
            }
        }

        _ => Json(json!({
            "jsonrpc": "2.0", "id": id,
            "error": {"code": -32601, "message": "method not found"}
        }))
        .into_response(),
    }
}
