//! GitHub Copilot CLI (runs through `gh copilot`).

use crate::patterns::CategoryDefinition;

/// Create the copilot category definition.
pub fn category() -> CategoryDefinition {
    CategoryDefinition::new("copilot")
        .with_description("GitHub Copilot CLI")
        .with_command(["gh", "copilot"])
        .with_pattern(r"│?\s*❯?\s*1\.\s*Yes,?\s+proceed")
        .with_pattern(r"❯\s*1\.\s*Yes")
        .with_pattern(r"Allow Copilot to run\b.*\?")
}
