//! HTTP plumbing shared by the provider clients.

use parley_core::error::{ModelBuildError, ProviderError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Build a client with a bounded per-call timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, ModelBuildError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ModelBuildError::HttpClient(e.to_string()))
}

/// Convert configured extra headers, rejecting names or values that are not
/// valid HTTP.
pub(crate) fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, ModelBuildError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (k, v) in headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .map_err(|e| ModelBuildError::HttpClient(format!("invalid header name '{k}': {e}")))?;
        let value = HeaderValue::from_str(v)
            .map_err(|e| ModelBuildError::HttpClient(format!("invalid value for header '{k}': {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

pub(crate) fn send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Map a non-success status to the matching provider error.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        return Err(ProviderError::RateLimited { retry_after_secs });
    }

    if status == 401 || status == 403 {
        return Err(ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ));
    }

    if !response.status().is_success() {
        let error_body = response.text().await.unwrap_or_default();
        warn!(provider, status, body = %error_body, "Provider returned error");
        return Err(ProviderError::ApiError {
            status_code: status,
            message: error_body,
        });
    }

    Ok(response)
}

/// Incremental splitter for a `text/event-stream` body.
///
/// Bytes go in as they arrive; complete `data:` payloads come out. Lines are
/// only decoded once their terminating newline has arrived, so a multi-byte
/// character split across chunks survives intact.
#[derive(Debug, Default)]
pub(crate) struct SseBuffer {
    buffer: Vec<u8>,
}

impl SseBuffer {
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(line_end) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=line_end).collect();
            if let Some(data) = data_payload(&raw[..line_end]) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Whatever is left once the body ends without a trailing newline.
    pub(crate) fn finish(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.buffer);
        data_payload(&raw)
    }
}

/// The payload of a `data:` line. Empty lines, comments and other fields
/// yield nothing.
fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches('\r');
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    line.strip_prefix("data:").map(|d| d.trim().to_string())
}
