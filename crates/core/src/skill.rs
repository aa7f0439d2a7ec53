//! Skills: conditionally injected instruction units.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A single skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Unique identifier
    pub key: String,

    /// Natural-language trigger condition. Empty means always active.
    #[serde(default)]
    pub when: String,

    /// Instruction text injected when the skill is active
    pub content: String,
}

impl Skill {
    pub fn new(key: impl Into<String>, when: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            when: when.into(),
            content: content.into(),
        }
    }

    pub fn is_always_active(&self) -> bool {
        self.when.trim().is_empty()
    }
}

/// Insertion-ordered skills with unique keys.
///
/// A skill pushed with a key that is already present replaces the earlier
/// one in place (last definition wins, first position kept).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillSet {
    skills: Vec<Skill>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, skill: Skill) {
        match self.skills.iter_mut().find(|s| s.key == skill.key) {
            Some(existing) => {
                warn!(key = %skill.key, "Duplicate skill key, later definition wins");
                *existing = skill;
            }
            None => self.skills.push(skill),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter()
    }

    pub fn always_active(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(|s| s.is_always_active())
    }

    pub fn conditional(&self) -> impl Iterator<Item = &Skill> {
        self.skills.iter().filter(|s| !s.is_always_active())
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl FromIterator<Skill> for SkillSet {
    fn from_iter<I: IntoIterator<Item = Skill>>(iter: I) -> Self {
        let mut set = Self::new();
        for skill in iter {
            set.push(skill);
        }
        set
    }
}

impl Extend<Skill> for SkillSet {
    fn extend<I: IntoIterator<Item = Skill>>(&mut self, iter: I) {
        for skill in iter {
            self.push(skill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_when_means_always() {
        assert!(Skill::new("tone", "", "be brief").is_always_active());
        assert!(Skill::new("tone", "  ", "be brief").is_always_active());
        assert!(!Skill::new("maths", "the user asks for a sum", "show working").is_always_active());
    }

    #[test]
    fn duplicate_keys_last_wins_in_first_position() {
        let set: SkillSet = vec![
            Skill::new("a", "", "first"),
            Skill::new("b", "", "other"),
            Skill::new("a", "when x", "second"),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        let keys: Vec<_> = set.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(set.get("a").unwrap().content, "second");
    }

    #[test]
    fn partitions_always_and_conditional() {
        let set: SkillSet = vec![
            Skill::new("always", "", "x"),
            Skill::new("sometimes", "on tuesdays", "y"),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.always_active().count(), 1);
        assert_eq!(set.conditional().next().unwrap().key, "sometimes");
    }
}
