//! Skill selection: picks which conditional skills apply to a message.

use parley_core::message::Message;
use parley_core::model::ChatModel;
use parley_core::skill::{Skill, SkillSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::prompt::selection_prompt;
use crate::step::{SkillSelection, parse_structured};

pub struct SkillSelector {
    model: Arc<dyn ChatModel>,
}

impl SkillSelector {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Active skills for `message`, in skill-set order.
    ///
    /// Always-active skills are always included. The selector model is only
    /// consulted when conditional skills exist; if it fails, or its answer
    /// cannot be parsed, only the always-active skills are returned. Keys the
    /// model invents are ignored.
    pub async fn select<'a>(&self, skills: &'a SkillSet, message: &str) -> Vec<&'a Skill> {
        if skills.conditional().next().is_none() {
            return skills.always_active().collect();
        }

        let messages = [
            Message::system(selection_prompt(skills.conditional())),
            Message::user(message),
        ];

        let chosen = match self.model.respond(&messages).await {
            Ok(response) => match parse_structured::<SkillSelection>(&response.content) {
                Ok(selection) => selection.keys,
                Err(e) => {
                    warn!(model = %self.model.name(), error = %e, "Unparseable skill selection, using always-active skills");
                    Vec::new()
                }
            },
            Err(e) => {
                warn!(model = %self.model.name(), error = %e, "Skill selection failed, using always-active skills");
                Vec::new()
            }
        };

        for key in &chosen {
            if skills.get(key).is_none_or(Skill::is_always_active) {
                debug!(key = %key, "Ignoring selected key that is not a conditional skill");
            }
        }

        let active: Vec<&Skill> = skills
            .iter()
            .filter(|s| s.is_always_active() || chosen.iter().any(|k| k == &s.key))
            .collect();
        debug!(active = active.len(), total = skills.len(), "Skills selected");
        active
    }
}
