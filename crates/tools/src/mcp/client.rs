//! MCP session over the streamable-HTTP transport, backed by `rmcp`.
//!
//! Custom headers ride on the underlying reqwest client, so every request of
//! the session (handshake, listing, calls) carries them.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use rmcp::model::{CallToolRequestParam, CallToolResult, ClientInfo, Implementation, Tool};
use rmcp::service::RunningService;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::{RoleClient, ServiceExt};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Name announced to servers during `initialize`.
pub const CLIENT_NAME: &str = "MCP-Agent";

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("invalid header '{0}'")]
    InvalidHeader(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// A connected, initialized MCP session.
pub struct McpClient {
    endpoint: String,
    timeout: Duration,
    service: RunningService<RoleClient, ClientInfo>,
}

impl McpClient {
    /// Open a session: `initialize`, then `notifications/initialized`.
    pub async fn connect(
        endpoint: &str,
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> Result<Self, McpError> {
        let http = reqwest::Client::builder()
            .default_headers(header_map(headers)?)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| McpError::Http(e.to_string()))?;

        let transport = StreamableHttpClientTransport::with_client(
            http,
            StreamableHttpClientTransportConfig::with_uri(endpoint.to_string()),
        );
        let service = within(timeout, client_info().serve(transport))
            .await
            .map_err(|e| match e {
                McpError::Request(reason) => McpError::Handshake(reason),
                other => other,
            })?;

        debug!(endpoint, "MCP session initialized");
        Ok(Self {
            endpoint: endpoint.to_string(),
            timeout,
            service,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Every tool the server advertises, following pagination cursors.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, McpError> {
        within(self.timeout, self.service.list_all_tools()).await
    }

    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<CallToolResult, McpError> {
        let params: CallToolRequestParam = serde_json::from_value(json!({
            "name": name,
            "arguments": arguments,
        }))
        .map_err(|e| McpError::Request(e.to_string()))?;
        within(self.timeout, self.service.call_tool(params)).await
    }
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: Default::default(),
        protocol_version: Default::default(),
        capabilities: Default::default(),
        client_info: Implementation {
            name: CLIENT_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        },
    }
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, McpError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes()).map_err(|_| McpError::InvalidHeader(k.clone()))?;
        let value = HeaderValue::from_str(v).map_err(|_| McpError::InvalidHeader(k.clone()))?;
        map.insert(name, value);
    }
    Ok(map)
}

async fn within<T, E: Display>(
    timeout: Duration,
    request: impl Future<Output = Result<T, E>>,
) -> Result<T, McpError> {
    match tokio::time::timeout(timeout, request).await {
        Ok(result) => result.map_err(|e| McpError::Request(e.to_string())),
        Err(_) => Err(McpError::Timeout(timeout)),
    }
}
