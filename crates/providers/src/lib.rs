//! Language-model clients for Parley.
//!
//! All clients and decorators implement `parley_core::ChatModel`.
//! The [`ModelBuilder`] selects the client from configuration and wraps it
//! in the logging and retry decorators.

pub mod builder;
pub mod gemini;
mod http;
pub mod logging;
pub mod openai;
pub mod retry;
pub mod schema;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod test_server;

pub use builder::{ModelBuilder, ProviderKind};
pub use gemini::GeminiModel;
pub use logging::LoggingModel;
pub use openai::{OpenAiModel, ReasoningEffort};
pub use retry::RetryModel;
pub use schema::ResponseSchema;
