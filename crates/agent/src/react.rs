//! ReAct engine: Reasoning + Acting in an interleaved loop.
//!
//! The ReAct pattern alternates between:
//! 1. **Thought**: the model reasons about what to do next
//! 2. **Action**: the model requests capability calls
//! 3. **Observation**: the results are fed back as the next message
//!
//! Every model response is a structured [`AgentStep`]. A step without
//! actions finishes the turn with its `reply`. The loop is bounded by
//! `max_iterations` (default 10).
//!
//! The conversation persists across turns for the lifetime of the engine,
//! so the model sees everything said since the session was (re)built.

use async_trait::async_trait;
use parley_core::engine::ReasoningEngine;
use parley_core::error::{Error, Result};
use parley_core::message::{Conversation, Message};
use parley_core::model::ChatModel;
use parley_core::notification::Notification;
use parley_core::skill::SkillSet;
use parley_core::tool::CapabilitySet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::prompt::{render_notification, system_prompt};
use crate::selector::SkillSelector;
use crate::step::{Action, AgentStep, parse_structured};
use crate::working_memory::{TraceKind, WorkingMemory};

/// Upper bound on think/act rounds within one turn.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// A ReAct engine instance. One per session build.
pub struct ReactEngine {
    model: Arc<dyn ChatModel>,
    selector: Option<SkillSelector>,
    capabilities: CapabilitySet,
    skills: SkillSet,
    personality: String,
    max_iterations: usize,
    conversation: Conversation,
    last_trace: Option<WorkingMemory>,
}

impl ReactEngine {
    pub fn new(model: Arc<dyn ChatModel>, capabilities: CapabilitySet) -> Self {
        Self {
            model,
            selector: None,
            capabilities,
            skills: SkillSet::new(),
            personality: String::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            conversation: Conversation::new(),
            last_trace: None,
        }
    }

    /// Model used to pick conditional skills. Without one, only
    /// always-active skills are ever injected.
    pub fn with_selector(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.selector = Some(SkillSelector::new(model));
        self
    }

    pub fn with_skills(mut self, skills: SkillSet) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The reasoning trace of the most recent turn.
    pub fn last_trace(&self) -> Option<&WorkingMemory> {
        self.last_trace.as_ref()
    }

    async fn active_skills_prompt(&self, message: &str) -> String {
        let active = match &self.selector {
            Some(selector) => selector.select(&self.skills, message).await,
            None => self.skills.always_active().collect(),
        };
        system_prompt(&self.personality, &self.capabilities, &active)
    }

    /// Run every requested action in order and record its observation.
    async fn act(&mut self, actions: &[Action], wm: &mut WorkingMemory) {
        for action in actions {
            let args = serde_json::Value::Object(action.args.clone());
            wm.add_action(&format!("{}({})", action.tool, args));

            let observation = match self.capabilities.call(&action.tool, action.args.clone()).await {
                Ok(output) => {
                    debug!(tool = %action.tool, len = output.len(), "Capability succeeded");
                    output
                }
                Err(e) => {
                    warn!(tool = %action.tool, error = %e, "Capability failed");
                    format!("Error: {e}")
                }
            };

            wm.add_observation(&observation);
            self.conversation
                .push(Message::tool(format!("Observation from {}: {}", action.tool, observation)));
        }
    }

    async fn run(&mut self, system: &str, wm: &mut WorkingMemory) -> Result<String> {
        while wm.tick() {
            debug!(iteration = wm.iterations, "ReAct iteration");

            let mut messages = Vec::with_capacity(self.conversation.messages.len() + 1);
            messages.push(Message::system(system));
            messages.extend(self.conversation.messages.iter().cloned());

            let response = self.model.respond(&messages).await?;
            self.conversation.push(Message::assistant(&response.content));

            let step: AgentStep = match parse_structured(&response.content) {
                Ok(step) => step,
                Err(e) => {
                    warn!(model = %self.model.name(), error = %e, "Model response was not a valid step");
                    let observation = format!("Error: your response was not a valid JSON step ({e})");
                    wm.add_observation(&observation);
                    self.conversation.push(Message::tool(observation));
                    continue;
                }
            };

            if !step.thought.is_empty() {
                wm.add_thought(&step.thought);
            }

            if step.is_final() {
                return Ok(step.reply.unwrap_or_default());
            }

            self.act(&step.actions, wm).await;
        }

        warn!(max = self.max_iterations, "ReAct: max iterations reached");
        Err(Error::Engine(format!(
            "no reply after {} reasoning iterations",
            self.max_iterations
        )))
    }
}

#[async_trait]
impl ReasoningEngine for ReactEngine {
    async fn send(&mut self, message: &str, notifications: &[Notification]) -> Result<String> {
        info!(
            model = %self.model.name(),
            conversation = %self.conversation.id,
            notifications = notifications.len(),
            history = self.conversation.len(),
            "ReAct turn starting"
        );

        let system = self.active_skills_prompt(message).await;

        for notification in notifications {
            self.conversation.push(Message::system(render_notification(notification)));
        }
        self.conversation.push(Message::user(message));

        let mut wm = WorkingMemory::new(self.max_iterations);
        let result = self.run(&system, &mut wm).await;

        info!(
            iterations = wm.iterations.min(self.max_iterations),
            actions = wm.count(TraceKind::Action),
            ok = result.is_ok(),
            "ReAct turn completed"
        );
        debug!(trace = %wm.render(), "ReAct trace");
        self.last_trace = Some(wm);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{SequentialMockModel, action_step, reply_step};
    use parley_core::error::ProviderError;
    use parley_core::message::Role;
    use parley_core::memory::ScratchPad;
    use parley_core::skill::Skill;
    use parley_memory::InMemoryScratchPad;
    use parley_tools::local_capabilities;
    use serde_json::json;

    fn engine(model: Arc<SequentialMockModel>) -> (ReactEngine, Arc<InMemoryScratchPad>) {
        let pad = Arc::new(InMemoryScratchPad::with_content("name: Bob"));
        let engine = ReactEngine::new(model, local_capabilities(pad.clone()).unwrap()).with_personality("You are Parley.");
        (engine, pad)
    }

    #[tokio::test]
    async fn direct_reply() {
        let model = Arc::new(SequentialMockModel::new(vec![reply_step("hey")]));
        let (mut engine, _) = engine(model.clone());

        let reply = engine.send("hi", &[]).await.unwrap();
        assert_eq!(reply, "hey");
        assert_eq!(model.call_count(), 1);

        let request = &model.requests()[0];
        assert_eq!(request[0].role, Role::System);
        assert!(request[0].content.starts_with("You are Parley."));
        assert!(request[0].content.contains("`rewrite_scratchpad`"));
        assert_eq!(request.last().unwrap().content, "hi");
    }

    #[tokio::test]
    async fn action_then_reply() {
        let model = Arc::new(SequentialMockModel::new(vec![
            action_step("read_scratchpad", json!({})),
            reply_step("you're Bob"),
        ]));
        let (mut engine, _) = engine(model.clone());

        let reply = engine.send("who am I?", &[]).await.unwrap();
        assert_eq!(reply, "you're Bob");

        let second = &model.requests()[1];
        let observation = second.last().unwrap();
        assert_eq!(observation.role, Role::Tool);
        assert_eq!(observation.content, "Observation from read_scratchpad: name: Bob");

        let trace = engine.last_trace().unwrap();
        assert_eq!(trace.iterations, 2);
        assert_eq!(trace.count(TraceKind::Action), 1);
    }

    #[tokio::test]
    async fn memory_conflicts_become_observations() {
        let model = Arc::new(SequentialMockModel::new(vec![
            action_step("rewrite_scratchpad", json!({"old_text": "Carol", "new_text": "Dave"})),
            action_step("rewrite_scratchpad", json!({"old_text": "Bob", "new_text": "Alice"})),
            reply_step("noted"),
        ]));
        let (mut engine, pad) = engine(model.clone());

        assert_eq!(engine.send("call me Alice", &[]).await.unwrap(), "noted");
        assert_eq!(pad.content().await.unwrap(), "name: Alice");

        let second = &model.requests()[1];
        assert_eq!(
            second.last().unwrap().content,
            "Observation from rewrite_scratchpad: Error: old text was not found in the scratchpad"
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_model() {
        let model = Arc::new(SequentialMockModel::new(vec![
            action_step("launch_rockets", json!({})),
            reply_step("can't do that"),
        ]));
        let (mut engine, _) = engine(model.clone());

        assert_eq!(engine.send("go", &[]).await.unwrap(), "can't do that");
        let observation = model.requests()[1].last().unwrap().content.clone();
        assert!(observation.contains("Error: Tool not found: launch_rockets"));
    }

    #[tokio::test]
    async fn empty_reply_is_silence() {
        let model = Arc::new(SequentialMockModel::new(vec![
            r#"{"thought":"not for me","actions":[],"reply":""}"#.to_string(),
            r#"{"thought":"still not for me","actions":[]}"#.to_string(),
        ]));
        let (mut engine, _) = engine(model);

        assert_eq!(engine.send("talking to someone else", &[]).await.unwrap(), "");
        assert_eq!(engine.send("still not you", &[]).await.unwrap(), "");
    }

    #[tokio::test]
    async fn notifications_precede_the_message_as_system_context() {
        let model = Arc::new(SequentialMockModel::new(vec![reply_step("hi Alice")]));
        let (mut engine, _) = engine(model.clone());

        let notes = [
            Notification::switch_user("Alice"),
            Notification::reminder("Alice", "Terminal"),
        ];
        engine.send("hello", &notes).await.unwrap();

        let request = &model.requests()[0];
        let tail: Vec<_> = request[1..].iter().map(|m| (m.role, m.content.clone())).collect();
        assert_eq!(tail.len(), 3);
        assert_eq!(tail[0].0, Role::System);
        assert!(tail[0].1.starts_with("[notification: switch_user]"));
        assert!(tail[1].1.starts_with("[notification: reminder]"));
        assert_eq!(tail[2], (Role::User, "hello".to_string()));
    }

    #[tokio::test]
    async fn history_persists_across_turns() {
        let model = Arc::new(SequentialMockModel::new(vec![reply_step("one"), reply_step("two")]));
        let (mut engine, _) = engine(model.clone());

        engine.send("first", &[]).await.unwrap();
        engine.send("second", &[]).await.unwrap();

        let contents: Vec<_> = model.requests()[1][1..].iter().map(|m| m.content.clone()).collect();
        assert_eq!(contents[0], "first");
        assert_eq!(contents[1], reply_step("one"));
        assert_eq!(contents[2], "second");
        assert_eq!(engine.conversation().by_role(Role::User).count(), 2);
        assert_eq!(engine.conversation().by_role(Role::Assistant).count(), 2);
    }

    #[tokio::test]
    async fn malformed_step_is_fed_back() {
        let model = Arc::new(SequentialMockModel::new(vec![
            "I think I'll just say hi".to_string(),
            reply_step("hi"),
        ]));
        let (mut engine, _) = engine(model.clone());

        assert_eq!(engine.send("hello", &[]).await.unwrap(), "hi");
        let feedback = model.requests()[1].last().unwrap().content.clone();
        assert!(feedback.starts_with("Error: your response was not a valid JSON step"));
    }

    #[tokio::test]
    async fn max_iterations_bounds_the_loop() {
        let model = Arc::new(SequentialMockModel::always(action_step("get_time", json!({}))));
        let (engine, _) = engine(model.clone());
        let mut engine = engine.with_max_iterations(3);

        let err = engine.send("loop forever", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
        assert_eq!(model.call_count(), 3);
    }

    #[tokio::test]
    async fn provider_failure_fails_the_turn() {
        let model = Arc::new(SequentialMockModel::failing(ProviderError::Timeout("slow".into())));
        let (mut engine, _) = engine(model);

        let err = engine.send("hello", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::Timeout(_))));
    }

    #[tokio::test]
    async fn selected_skills_reach_the_prompt() {
        let model = Arc::new(SequentialMockModel::new(vec![reply_step("sunny")]));
        let selector = Arc::new(SequentialMockModel::new(vec![r#"{"keys":["weather"]}"#]));
        let skills: SkillSet = [
            Skill::new("tone", "", "Keep it short."),
            Skill::new("weather", "the user asks about the weather", "Mention the umbrella."),
            Skill::new("code", "the user asks about code", "Use code blocks."),
        ]
        .into_iter()
        .collect();

        let (engine, _) = engine(model.clone());
        let mut engine = engine.with_selector(selector.clone()).with_skills(skills);
        engine.send("will it rain?", &[]).await.unwrap();

        let system = model.requests()[0][0].content.clone();
        assert!(system.contains("Keep it short."));
        assert!(system.contains("Mention the umbrella."));
        assert!(!system.contains("Use code blocks."));
        assert_eq!(selector.call_count(), 1);
    }
}
