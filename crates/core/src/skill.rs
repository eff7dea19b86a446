//! Skill presets: named (system-prompt addendum, allowed-tool subset) pairs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
    #[serde(default, rename = "systemPrompt", skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, rename = "allowedTools", skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
}

/// Immutable lookup table of compiled-in skills, so `skill_list` answers
/// synchronously with no round-trip to any external collaborator.
#[derive(Debug, Clone, Default)]
pub struct SkillTable {
    skills: Vec<Skill>,
}

impl SkillTable {
    pub fn new(skills: Vec<Skill>) -> Self {
        Self { skills }
    }

    pub fn all(&self) -> &[Skill] {
        &self.skills
    }

    pub fn find(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
#[path = "skill_tests.rs"]
mod tests;
