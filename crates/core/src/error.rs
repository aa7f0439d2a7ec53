//! Error types for the Parley domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// The top-level error type for all Parley operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Model construction errors ---
    #[error("Model construction failed: {0}")]
    ModelBuild(#[from] ModelBuildError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Session errors ---
    #[error("Session reset failed: {0}")]
    SessionReset(#[source] Box<Error>),

    #[error("Reasoning engine error: {0}")]
    Engine(String),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures from a single model call. These are the transient errors the
/// retry decorator re-issues calls for.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    InvalidResponse(String),
}

/// Construction-time failures of the model builder. Never retried: the
/// builder must be called again with corrected configuration.
#[derive(Debug, Clone, Error)]
pub enum ModelBuildError {
    #[error("unrecognised provider '{0}'")]
    UnknownProvider(String),

    #[error("unrecognised reasoning effort '{0}'")]
    UnknownReasoningEffort(String),

    #[error("failed to derive response schema for {type_name}: {reason}")]
    Schema { type_name: String, reason: String },

    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("old text was not found in the scratchpad")]
    NotFound,

    #[error("old text was ambiguous in the scratchpad ({occurrences} occurrences)")]
    Ambiguous { occurrences: usize },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl MemoryError {
    /// Whether this is an edit-anchor conflict the caller can fix by quoting
    /// the old text more precisely.
    pub fn is_edit_conflict(&self) -> bool {
        matches!(self, MemoryError::NotFound | MemoryError::Ambiguous { .. })
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("tool returned no content: {0}")]
    EmptyToolResult(String),

    #[error("Duplicate capability name: {0}")]
    DuplicateName(String),

    #[error("Tool discovery failed for {endpoint}: {reason}")]
    Discovery { endpoint: String, reason: String },

    #[error(transparent)]
    Memory(#[from] MemoryError),
}
