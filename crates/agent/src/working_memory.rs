//! Working memory: the reasoning trace of a single turn.
//!
//! Records Thought/Action/Observation entries and counts iterations so the
//! engine can stop at its bound. Cleared at the start of every turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingMemory {
    pub trace: Vec<TraceEntry>,
    pub iterations: usize,
    pub max_iterations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub kind: TraceKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TraceKind {
    Thought,
    Action,
    Observation,
}

impl WorkingMemory {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            trace: Vec::new(),
            iterations: 0,
            max_iterations,
        }
    }

    pub fn add_thought(&mut self, thought: &str) {
        self.push_trace(TraceKind::Thought, thought);
    }

    pub fn add_action(&mut self, action: &str) {
        self.push_trace(TraceKind::Action, action);
    }

    pub fn add_observation(&mut self, observation: &str) {
        self.push_trace(TraceKind::Observation, observation);
    }

    fn push_trace(&mut self, kind: TraceKind, content: &str) {
        self.trace.push(TraceEntry {
            kind,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Increment the iteration counter. Returns `false` if max exceeded.
    pub fn tick(&mut self) -> bool {
        self.iterations += 1;
        self.iterations <= self.max_iterations
    }

    pub fn count(&self, kind: TraceKind) -> usize {
        self.trace.iter().filter(|e| e.kind == kind).count()
    }

    /// Human-readable trace, one `[Kind] content` line per entry.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.trace {
            let label = match entry.kind {
                TraceKind::Thought => "Thought",
                TraceKind::Action => "Action",
                TraceKind::Observation => "Observation",
            };
            out.push_str(&format!("[{label}] {}\n", entry.content));
        }
        out.push_str(&format!("Iterations: {}/{}\n", self.iterations, self.max_iterations));
        out
    }
}
