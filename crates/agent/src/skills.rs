//! The compiled-in skill preset table.

use vibecheck_core::{Skill, SkillTable};

pub fn default_skill_table() -> SkillTable {
    SkillTable::new(vec![
        Skill {
            id: "reviewer".into(),
            name: "Code Reviewer".into(),
            icon: "🔍".into(),
            description: "Reviews a diff or file for bugs and style issues.".into(),
            system_prompt: Some(
                "You are reviewing code for correctness and clarity. Point out concrete defects, not style nits."
                    .into(),
            ),
            allowed_tools: Some(vec!["Read".into(), "Grep".into(), "Glob".into()]),
        },
        Skill {
            id: "debugger".into(),
            name: "Debugger".into(),
            icon: "🐛".into(),
            description: "Reproduces and fixes a reported bug.".into(),
            system_prompt: Some("Reproduce the bug before proposing a fix. Prefer the smallest correct change.".into()),
            allowed_tools: None,
        },
        Skill {
            id: "explainer".into(),
            name: "Explainer".into(),
            icon: "💡".into(),
            description: "Explains how a part of the codebase works, without editing it.".into(),
            system_prompt: Some("Explain, do not modify any files.".into()),
            allowed_tools: Some(vec!["Read".into(), "Grep".into(), "Glob".into(), "WebSearch".into()]),
        },
    ])
}

#[cfg(test)]
#[path = "skills_tests.rs"]
mod tests;
