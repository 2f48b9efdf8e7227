//! OpenAI Codex CLI.

use crate::patterns::CategoryDefinition;

/// Create the codex category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("codex")
        .with_description("OpenAI Codex CLI")
        .with_command(["codex"])
        .with_pattern(r">\s*1\.\s*Yes")
        .with_pattern(r">\s*1\.\s*Yes,?\s+allow Codex to work")
        .with_pattern(r">\s*1\.\s*Approve and run now")
}
