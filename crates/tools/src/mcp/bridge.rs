//! Tool bridge: adapts remote MCP tools into local capabilities.
//!
//! Each enabled endpoint gets its own session. Endpoints are discovered
//! concurrently and their capabilities concatenated in configuration order.
//! An endpoint that fails discovery is logged and left out.

use async_trait::async_trait;
use futures::future::join_all;
use parley_config::ToolConfig;
use parley_core::error::ToolError;
use parley_core::tool::{Capability, ToolArgs};
use rmcp::model::{RawContent, Tool};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::client::McpClient;

/// A remote tool exposed through the capability interface.
pub struct McpCapability {
    client: Arc<McpClient>,
    name: String,
    description: Vec<String>,
}

impl McpCapability {
    pub fn new(client: Arc<McpClient>, tool: &Tool) -> Self {
        Self {
            client,
            name: tool.name.to_string(),
            description: describe(tool),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }
}

/// Base description, then one line per parameter:
/// ``Param [required] `name` (type): description``.
fn describe(tool: &Tool) -> Vec<String> {
    let mut lines = vec![tool.description.as_deref().unwrap_or_default().to_string()];

    let required: Vec<&str> = tool
        .input_schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let Some(properties) = tool.input_schema.get("properties").and_then(Value::as_object) else {
        return lines;
    };

    for (name, prop) in properties {
        let marker = if required.contains(&name.as_str()) {
            " [required]"
        } else {
            ""
        };
        let ty = match prop.get("type") {
            Some(Value::String(t)) => t.clone(),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("|"),
            _ => "any".into(),
        };
        let desc = prop.get("description").and_then(Value::as_str).unwrap_or_default();
        lines.push(format!("Param{marker} `{name}` ({ty}): {desc}"));
    }
    lines
}

#[async_trait]
impl Capability for McpCapability {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Vec<String> {
        self.description.clone()
    }

    async fn call(&self, args: ToolArgs) -> Result<String, ToolError> {
        debug!(tool = %self.name, endpoint = %self.endpoint(), "Calling remote tool");

        let result = self
            .client
            .call_tool(&self.name, Value::Object(args))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name.clone(),
                reason: e.to_string(),
            })?;

        let texts: Vec<&str> = result
            .content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect();

        if result.is_error.unwrap_or(false) {
            return Err(ToolError::ExecutionFailed {
                tool_name: self.name.clone(),
                reason: if texts.is_empty() {
                    "remote tool reported an error".into()
                } else {
                    texts.join("\n\n")
                },
            });
        }
        if texts.is_empty() {
            return Err(ToolError::EmptyToolResult(self.name.clone()));
        }
        Ok(texts.join("\n\n"))
    }
}

/// Connect to one endpoint and adapt every tool it lists.
pub async fn discover(
    endpoint: &str,
    headers: &HashMap<String, String>,
    timeout: Duration,
) -> Result<Vec<Arc<dyn Capability>>, ToolError> {
    let fail = |reason: String| ToolError::Discovery {
        endpoint: endpoint.to_string(),
        reason,
    };

    let client = Arc::new(
        McpClient::connect(endpoint, headers, timeout)
            .await
            .map_err(|e| fail(e.to_string()))?,
    );
    let tools = client.list_tools().await.map_err(|e| fail(e.to_string()))?;

    info!(endpoint, tools = tools.len(), "Discovered remote tools");
    Ok(tools
        .iter()
        .map(|tool| Arc::new(McpCapability::new(client.clone(), tool)) as Arc<dyn Capability>)
        .collect())
}

/// Discover every enabled endpoint. Disabled entries are never contacted;
/// an endpoint that fails discovery contributes nothing and does not affect
/// the others.
pub async fn discover_all(configs: &[ToolConfig], timeout: Duration) -> Vec<Arc<dyn Capability>> {
    let enabled: Vec<&ToolConfig> = configs
        .iter()
        .filter(|c| {
            if !c.enabled {
                debug!(endpoint = %c.url, "Skipping disabled tool endpoint");
            }
            c.enabled
        })
        .collect();

    let per_endpoint = join_all(
        enabled
            .iter()
            .map(|c| discover(&c.url, &c.headers, timeout)),
    )
    .await;

    per_endpoint
        .into_iter()
        .filter_map(|discovered| match discovered {
            Ok(capabilities) => Some(capabilities),
            Err(e) => {
                warn!(error = %e, "Tool endpoint skipped");
                None
            }
        })
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::test_server::FakeMcpServer;
    use serde_json::json;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn tool_config(url: String, enabled: bool) -> ToolConfig {
        ToolConfig {
            url,
            headers: HashMap::new(),
            enabled,
        }
    }

    #[test]
    fn description_lines() {
        let tool: Tool = serde_json::from_value(json!({
            "name": "forecast",
            "description": "Get the weather forecast",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "City name"},
                    "days": {"type": "integer", "description": "How many days"}
                },
                "required": ["city"]
            }
        }))
        .unwrap();

        assert_eq!(
            describe(&tool),
            vec![
                "Get the weather forecast",
                "Param [required] `city` (string): City name",
                "Param `days` (integer): How many days",
            ]
        );
    }

    #[test]
    fn description_tolerates_sparse_schemas() {
        let tool: Tool = serde_json::from_value(json!({
            "name": "ping",
            "inputSchema": {"properties": {"x": {}}}
        }))
        .unwrap();
        assert_eq!(describe(&tool), vec!["", "Param `x` (any): "]);
    }

    #[tokio::test]
    async fn discovers_across_pages_with_session() {
        let server = FakeMcpServer::start().await;
        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer t0k".to_string());

        let caps = discover(&server.url(), &headers, TIMEOUT).await.unwrap();
        let names: Vec<_> = caps.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["echo", "silent", "broken", "sse_echo"]);

        let log = server.log();
        assert_eq!(log[0].method, "initialize");
        assert_eq!(log[1].method, "notifications/initialized");
        assert_eq!(log[2].method, "tools/list");
        assert_eq!(log[3].method, "tools/list");
        assert!(log.iter().all(|r| r.authorization.as_deref() == Some("Bearer t0k")));
        // Every request after initialize carries the session id
        assert!(log[1..].iter().all(|r| r.session.as_deref() == Some("sess-1")));
        assert_eq!(log[0].client_name.as_deref(), Some("MCP-Agent"));
    }

    #[tokio::test]
    async fn invocation_joins_text_blocks() {
        let server = FakeMcpServer::start().await;
        let caps = discover(&server.url(), &HashMap::new(), TIMEOUT).await.unwrap();
        let echo = caps.iter().find(|c| c.name() == "echo").unwrap();

        let mut args = ToolArgs::new();
        args.insert("text".into(), json!("hi"));
        assert_eq!(echo.call(args).await.unwrap(), "hi\n\nhi again");
        assert!(echo.description()[1].contains("[required] `text`"));
    }

    #[tokio::test]
    async fn event_stream_responses_are_understood() {
        let server = FakeMcpServer::start().await;
        let caps = discover(&server.url(), &HashMap::new(), TIMEOUT).await.unwrap();
        let tool = caps.iter().find(|c| c.name() == "sse_echo").unwrap();

        let mut args = ToolArgs::new();
        args.insert("text".into(), json!("streamed"));
        assert_eq!(tool.call(args).await.unwrap(), "streamed");
    }

    #[tokio::test]
    async fn no_text_is_empty_tool_result() {
        let server = FakeMcpServer::start().await;
        let caps = discover(&server.url(), &HashMap::new(), TIMEOUT).await.unwrap();
        let silent = caps.iter().find(|c| c.name() == "silent").unwrap();

        let err = silent.call(ToolArgs::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::EmptyToolResult(ref n) if n == "silent"));
    }

    #[tokio::test]
    async fn error_results_fail_with_their_text() {
        let server = FakeMcpServer::start().await;
        let caps = discover(&server.url(), &HashMap::new(), TIMEOUT).await.unwrap();
        let broken = caps.iter().find(|c| c.name() == "broken").unwrap();

        match broken.call(ToolArgs::new()).await.unwrap_err() {
            ToolError::ExecutionFailed { tool_name, reason } => {
                assert_eq!(tool_name, "broken");
                assert_eq!(reason, "disk on fire");
            }
            other => panic!("Expected ExecutionFailed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn disabled_endpoint_contributes_nothing() {
        let server = FakeMcpServer::start().await;
        let caps = discover_all(&[tool_config(server.url(), false)], TIMEOUT).await;
        assert!(caps.is_empty());
        assert!(server.log().is_empty());
    }

    #[tokio::test]
    async fn endpoints_are_unioned_in_order() {
        let first = FakeMcpServer::start().await;
        let second = FakeMcpServer::with_tools(vec![json!({"name": "only_here", "inputSchema": {"type": "object"}})]).await;
        let caps = discover_all(
            &[
                tool_config(second.url(), true),
                tool_config(first.url(), false),
                tool_config(first.url(), true),
            ],
            TIMEOUT,
        )
        .await;

        let names: Vec<_> = caps.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["only_here", "echo", "silent", "broken", "sse_echo"]);
    }

    #[tokio::test]
    async fn unreachable_endpoint_names_itself() {
        let err = discover("http://127.0.0.1:9/mcp", &HashMap::new(), TIMEOUT)
            .await
            .err()
            .unwrap();
        match err {
            ToolError::Discovery { endpoint, .. } => assert_eq!(endpoint, "http://127.0.0.1:9/mcp"),
            other => panic!("Expected Discovery, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failing_endpoint_leaves_others_intact() {
        let server = FakeMcpServer::start().await;
        let caps = discover_all(
            &[
                tool_config("http://127.0.0.1:9/mcp".into(), true),
                tool_config(server.url(), true),
            ],
            TIMEOUT,
        )
        .await;

        let names: Vec<_> = caps.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["echo", "silent", "broken", "sse_echo"]);
    }
}
