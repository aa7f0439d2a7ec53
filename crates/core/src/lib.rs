//! # Parley Core
//!
//! Domain types, traits, and error definitions for the Parley assistant
//! orchestration layer. This crate has **no framework dependencies**: it
//! defines the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every seam is defined as a trait here:
//! - [`ChatModel`]: a callable language model (raw clients and decorators)
//! - [`Capability`]: anything the reasoning engine can invoke
//! - [`ScratchPad`]: the persistent private memory blob
//! - [`ReasoningEngine`]: the think/act/observe loop driven once per turn
//!
//! Implementations live in their respective crates, which keeps mocks trivial
//! and the dependency graph pointing inward.

pub mod engine;
pub mod error;
pub mod memory;
pub mod message;
pub mod model;
pub mod notification;
pub mod skill;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use engine::ReasoningEngine;
pub use error::{Error, Result};
pub use memory::ScratchPad;
pub use message::{Conversation, ConversationId, Message, Role};
pub use model::{ChatModel, ModelPurpose, ModelResponse, StreamCallbacks, Usage};
pub use notification::{Notification, NotificationKind};
pub use skill::{Skill, SkillSet};
pub use tool::{Capability, CapabilitySet, ToolArgs};
