//! System prompt assembly.
//!
//! The prompt is rebuilt every iteration from three sections: the persona,
//! the capability catalogue, and whichever skills are active this turn.

use parley_core::notification::Notification;
use parley_core::skill::Skill;
use parley_core::tool::CapabilitySet;

const LOOP_INSTRUCTIONS: &str = "\
You work in a loop of Thought, Action and Observation.
Every response is a single JSON object with these fields:
- thought: your private reasoning about what to do next
- actions: the capabilities to call now, each as {\"tool\": name, \"args\": {...}}
- reply: your message to the user, or null while you still have actions to take
Observations from your actions arrive as the next message. When you are done, \
leave actions empty and put your message in reply. An empty reply means you \
choose not to answer at all.
Messages starting with [notification: ...] are context from the system, not \
something the user said.";

/// Render the full system prompt.
pub fn system_prompt(personality: &str, capabilities: &CapabilitySet, skills: &[&Skill]) -> String {
    let mut sections = vec![personality.trim().to_string(), LOOP_INSTRUCTIONS.to_string()];

    if !capabilities.is_empty() {
        let mut out = String::from("## Capabilities\n");
        for cap in capabilities.iter() {
            let mut lines = cap.description().into_iter();
            let summary = lines.next().unwrap_or_default();
            out.push_str(&format!("- `{}`: {}\n", cap.name(), summary));
            for line in lines {
                out.push_str(&format!("    {line}\n"));
            }
        }
        sections.push(out.trim_end().to_string());
    }

    if !skills.is_empty() {
        let mut out = String::from("## Skills\n");
        for skill in skills {
            out.push_str(&format!("### {}\n{}\n\n", skill.key, skill.content.trim()));
        }
        sections.push(out.trim_end().to_string());
    }

    sections.join("\n\n")
}

/// A notification as it is shown to the model.
pub fn render_notification(notification: &Notification) -> String {
    format!("[notification: {}] {}", notification.kind, notification.content)
}

/// Instructions for the skill selector.
pub fn selection_prompt<'a>(conditional: impl Iterator<Item = &'a Skill>) -> String {
    let mut out = String::from(
        "Decide which of the following skills apply to the user's message. \
         Respond with a JSON object {\"keys\": [...]} listing the keys of every applicable skill, \
         or an empty list if none apply.\n\n",
    );
    for skill in conditional {
        out.push_str(&format!("- {}: {}\n", skill.key, skill.when.trim()));
    }
    out
}
