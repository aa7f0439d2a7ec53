//! The agent layer of Parley.
//!
//! Every turn flows through the same path:
//!
//! 1. **Receive** a message with its author and location (from any transport)
//! 2. **Session** decides whether the engine must be rebuilt and which
//!    notifications (switch_user, switch_location, reminder) go with it
//! 3. **Select skills** with the selector model
//! 4. **Reason** in a Thought → Action → Observation loop with the agent model
//! 5. **Reply** with the final step's text, or stay silent
//!
//! [`Assistant`] is the composition root transports talk to.

pub mod assistant;
pub mod factory;
pub mod prompt;
pub mod react;
pub mod selector;
pub mod session;
pub mod step;
pub mod working_memory;

#[cfg(test)]
mod test_helpers;

pub use assistant::{APOLOGY, Assistant};
pub use factory::{AgentBuilder, EngineFactory, assemble_capabilities};
pub use react::{DEFAULT_MAX_ITERATIONS, ReactEngine};
pub use selector::SkillSelector;
pub use session::{DEFAULT_IDLE_TIMEOUT, SessionContext, SessionRuntime, SessionState};
pub use step::{Action, AgentStep, SkillSelection};
pub use working_memory::{TraceEntry, TraceKind, WorkingMemory};
